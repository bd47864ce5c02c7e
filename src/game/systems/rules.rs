use crate::game::types::Outcome;

/// Win/loss rule. A dead player loses even if the same blast cleared the
/// last enemy.
pub fn evaluate(enemy_count: usize, health: i32) -> Option<Outcome> {
    if health <= 0 {
        Some(Outcome::Loss)
    } else if enemy_count == 0 {
        Some(Outcome::Win)
    } else {
        None
    }
}
