//! Keyboard mapping
//!
//! Keys are reported by the front end as press/release pairs. Movement keys are
//! held state; everything else maps to a one-shot `Command`.

use crate::sim::{MoveIntent, SessionPhase};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    S,
    P,
    M,
    H,
    Space,
    Enter,
    Escape,
}

impl Key {
    /// Map a key name as reported by most windowing layers ("ArrowLeft", "a", " ", ...)
    pub fn from_name(name: &str) -> Option<Key> {
        let key = match name {
            "ArrowLeft" | "Left" => Key::Left,
            "ArrowRight" | "Right" => Key::Right,
            "ArrowUp" | "Up" => Key::Up,
            "ArrowDown" | "Down" => Key::Down,
            "a" | "A" => Key::A,
            "d" | "D" => Key::D,
            "w" | "W" => Key::W,
            "s" | "S" => Key::S,
            "p" | "P" => Key::P,
            "m" | "M" => Key::M,
            "h" | "H" => Key::H,
            " " | "Space" => Key::Space,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            _ => return None,
        };
        Some(key)
    }
}

/// One-shot actions produced by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    TogglePause,
    ToggleMusic,
    Restart,
    ReturnToMenu,
    ShowHighScores,
}

/// Held-key tracker
#[derive(Debug, Clone, Default)]
pub struct Controls {
    intent: MoveIntent,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press in the given phase.
    /// While paused only the pause key does anything.
    pub fn key_down(&mut self, key: Key, phase: SessionPhase) -> Option<Command> {
        if phase == SessionPhase::Paused {
            return (key == Key::P).then_some(Command::TogglePause);
        }

        if phase == SessionPhase::Running && self.set_movement(key, true) {
            return None;
        }

        match (key, phase) {
            (Key::P, SessionPhase::Running) => Some(Command::TogglePause),
            (Key::M, _) => Some(Command::ToggleMusic),
            (Key::Enter, SessionPhase::Idle) => Some(Command::Start),
            (Key::H, SessionPhase::Idle) => Some(Command::ShowHighScores),
            (Key::Space, SessionPhase::GameOver) => Some(Command::Restart),
            (Key::Escape, SessionPhase::GameOver) => Some(Command::ReturnToMenu),
            _ => None,
        }
    }

    /// Handle a key release; always clears movement, whatever the phase
    pub fn key_up(&mut self, key: Key) {
        self.set_movement(key, false);
    }

    /// Currently held movement
    pub fn intent(&self) -> MoveIntent {
        self.intent
    }

    /// Forget all held keys (focus loss, new session)
    pub fn release_all(&mut self) {
        self.intent = MoveIntent::default();
    }

    fn set_movement(&mut self, key: Key, held: bool) -> bool {
        let flag = match key {
            Key::Left | Key::A => &mut self.intent.left,
            Key::Right | Key::D => &mut self.intent.right,
            Key::Up | Key::W => &mut self.intent.up,
            Key::Down | Key::S => &mut self.intent.down,
            _ => return false,
        };
        *flag = held;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys_and_aliases() {
        let mut controls = Controls::new();
        assert_eq!(controls.key_down(Key::A, SessionPhase::Running), None);
        assert_eq!(controls.key_down(Key::Up, SessionPhase::Running), None);
        assert!(controls.intent().left && controls.intent().up);

        controls.key_up(Key::Left);
        assert!(!controls.intent().left);
        assert!(controls.intent().up);
    }

    #[test]
    fn test_paused_only_listens_for_pause() {
        let mut controls = Controls::new();
        assert_eq!(controls.key_down(Key::Left, SessionPhase::Paused), None);
        assert_eq!(controls.key_down(Key::M, SessionPhase::Paused), None);
        assert!(!controls.intent().left);
        assert_eq!(
            controls.key_down(Key::P, SessionPhase::Paused),
            Some(Command::TogglePause)
        );
    }

    #[test]
    fn test_release_while_paused_clears_flag() {
        let mut controls = Controls::new();
        controls.key_down(Key::Right, SessionPhase::Running);
        controls.key_up(Key::D);
        assert!(!controls.intent().right);

        controls.key_down(Key::Right, SessionPhase::Running);
        // Key released after pausing
        controls.key_up(Key::Right);
        assert_eq!(controls.intent(), MoveIntent::default());
    }

    #[test]
    fn test_phase_specific_commands() {
        let mut controls = Controls::new();
        assert_eq!(
            controls.key_down(Key::Enter, SessionPhase::Idle),
            Some(Command::Start)
        );
        assert_eq!(
            controls.key_down(Key::H, SessionPhase::Idle),
            Some(Command::ShowHighScores)
        );
        assert_eq!(controls.key_down(Key::Space, SessionPhase::Running), None);
        assert_eq!(
            controls.key_down(Key::Space, SessionPhase::GameOver),
            Some(Command::Restart)
        );
        assert_eq!(
            controls.key_down(Key::Escape, SessionPhase::GameOver),
            Some(Command::ReturnToMenu)
        );
        assert_eq!(controls.key_down(Key::P, SessionPhase::Idle), None);
        assert_eq!(
            controls.key_down(Key::M, SessionPhase::Running),
            Some(Command::ToggleMusic)
        );
    }

    #[test]
    fn test_movement_ignored_outside_a_session() {
        let mut controls = Controls::new();
        controls.key_down(Key::Left, SessionPhase::Idle);
        controls.key_down(Key::W, SessionPhase::GameOver);
        assert_eq!(controls.intent(), MoveIntent::default());
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_name("w"), Some(Key::W));
        assert_eq!(Key::from_name(" "), Some(Key::Space));
        assert_eq!(Key::from_name("q"), None);
    }
}
