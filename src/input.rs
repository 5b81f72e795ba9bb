// Keyboard-to-direction mapping and the FIFO of pending moves.
use std::collections::VecDeque;

use log::debug;

use crate::board::Direction;

/// Real-time pause after a win so a burst of keys doesn't skip the banner.
pub const WIN_INPUT_PAUSE_MS: f64 = 2500.0;

impl Direction {
    /// Arrow keys, WASD and vi keys. Unknown keys map to `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => return Some(Direction::Right),
            "ArrowLeft" => return Some(Direction::Left),
            "ArrowUp" => return Some(Direction::Up),
            "ArrowDown" => return Some(Direction::Down),
            _ => {}
        }
        let mut chars = key.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        match c.to_ascii_lowercase() {
            'd' | 'l' => Some(Direction::Right),
            'a' | 'h' => Some(Direction::Left),
            'w' | 'k' => Some(Direction::Up),
            's' | 'j' => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<Direction>,
    blocked_until: f64,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a direction unless input is paused at `now_ms`. Returns whether it was kept.
    pub fn push(&mut self, direction: Direction, now_ms: f64) -> bool {
        if now_ms < self.blocked_until {
            debug!("dropped {direction:?}: input paused for {:.0}ms", self.blocked_until - now_ms);
            return false;
        }
        self.pending.push_back(direction);
        true
    }

    /// Map a key name and queue it; unrecognised keys are ignored.
    pub fn push_key(&mut self, key: &str, now_ms: f64) -> bool {
        Direction::from_key(key).is_some_and(|d| self.push(d, now_ms))
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    pub fn block_until(&mut self, deadline_ms: f64) {
        self.blocked_until = deadline_ms;
    }

    pub fn is_blocked(&self, now_ms: f64) -> bool {
        now_ms < self.blocked_until
    }

    /// Drop pending moves and lift any pause.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.blocked_until = 0.0;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Direction::from_key("ArrowRight"), Some(Direction::Right));
        assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(Direction::from_key("a"), Some(Direction::Left));
        assert_eq!(Direction::from_key("S"), Some(Direction::Down));
        assert_eq!(Direction::from_key("k"), Some(Direction::Up));
        assert_eq!(Direction::from_key("x"), None);
        assert_eq!(Direction::from_key("Enter"), None);
        assert_eq!(Direction::from_key(""), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut q = InputQueue::new();
        assert!(q.push(Direction::Up, 0.0));
        assert!(q.push_key("ArrowLeft", 0.0));
        assert!(!q.push_key("q", 0.0));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(Direction::Up));
        assert_eq!(q.pop(), Some(Direction::Left));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_pause_drops_until_deadline() {
        let mut q = InputQueue::new();
        q.block_until(1000.0 + WIN_INPUT_PAUSE_MS);
        assert!(q.is_blocked(1200.0));
        assert!(!q.push(Direction::Down, 1200.0));
        assert!(q.is_empty());
        assert!(q.push(Direction::Down, 3500.0));
        assert_eq!(q.len(), 1);
        q.block_until(10_000.0);
        q.clear();
        assert!(q.is_empty());
        assert!(!q.is_blocked(0.0));
    }
}
