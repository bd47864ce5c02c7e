//! Keyboard input: one key press, one player event.
//!
//! Keys are read in raw mode on a dedicated thread, since crossterm's
//! `event::read` blocks. The thread exits once the session stops listening.

use std::thread;
use std::time::Duration;

use actix::Recipient;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, warn};

use crate::game::types::Direction;
use crate::session::messages::PlayerCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    Move(Direction),
    PlantBomb,
    Interact,
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The event bound to `key`, if any. Releases and repeats are ignored.
pub fn decode_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }
    let event = match key.code {
        KeyCode::Up => InputEvent::Move(Direction::Up),
        KeyCode::Left => InputEvent::Move(Direction::Left),
        KeyCode::Down => InputEvent::Move(Direction::Down),
        KeyCode::Right => InputEvent::Move(Direction::Right),
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
            'w' => InputEvent::Move(Direction::Up),
            'a' => InputEvent::Move(Direction::Left),
            's' => InputEvent::Move(Direction::Down),
            'd' => InputEvent::Move(Direction::Right),
            'b' | ' ' => InputEvent::PlantBomb,
            'e' => InputEvent::Interact,
            'q' => InputEvent::Quit,
            _ => return None,
        },
        _ => return None,
    };
    Some(event)
}

/// Forward key presses to `target` until quit, a terminal error, or the
/// session going away. Terminal errors count as quit.
pub fn spawn_reader(target: Recipient<PlayerCommand>) {
    let spawned = thread::Builder::new()
        .name("input".into())
        .spawn(move || read_keys(&target));
    if let Err(err) = spawned {
        warn!("[Input] Failed to start the key reader: {}", err);
    }
}

fn read_keys(target: &Recipient<PlayerCommand>) {
    while target.connected() {
        let ready = match event::poll(POLL_INTERVAL) {
            Ok(ready) => ready,
            Err(err) => {
                warn!("[Input] Failed to poll the terminal: {}", err);
                target.do_send(PlayerCommand(InputEvent::Quit));
                return;
            }
        };
        if !ready {
            continue;
        }
        match event::read() {
            Ok(Event::Key(key)) => {
                if let Some(input) = decode_key(key) {
                    target.do_send(PlayerCommand(input));
                    if input == InputEvent::Quit {
                        return;
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!("[Input] Failed to read the terminal: {}", err);
                target.do_send(PlayerCommand(InputEvent::Quit));
                return;
            }
        }
    }
    debug!("[Input] Session gone, key reader stopping");
}
