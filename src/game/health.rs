//! Bounded health counter.

/// Health in `[0, max]`. Owned by the health keeper, which is its only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    value: i32,
    max: i32,
}

impl Health {
    pub fn full(max: i32) -> Self {
        debug_assert!(max > 0, "max health must be positive");
        Self { value: max, max }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn apply(&mut self, delta: i32) -> i32 {
        self.value = self.value.saturating_add(delta).clamp(0, self.max);
        self.value
    }
}
