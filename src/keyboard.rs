use crate::error::{Error, Result};

pub const KEY_COUNT: usize = 16;

/// Latch of the 16 hex keys. Written by the host, only read by the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        let slot = self
            .keys
            .get_mut(key as usize)
            .ok_or(Error::InvalidKey(key))?;
        *slot = pressed;
        Ok(())
    }

    /// Register values name keys, so only the low nibble counts.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0xF) as usize]
    }

    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut kb = Keyboard::new();
        kb.set_key(0xA, true).unwrap();
        assert!(kb.is_pressed(0xA));
        assert!(kb.is_pressed(0x1A));
        kb.set_key(0xA, false).unwrap();
        assert!(!kb.is_pressed(0xA));
    }

    #[test]
    fn out_of_range_key_is_rejected() {
        let mut kb = Keyboard::new();
        assert_eq!(kb.set_key(0x10, true), Err(Error::InvalidKey(0x10)));
        assert_eq!(kb.first_pressed(), None);
    }

    #[test]
    fn first_pressed_is_lowest_index() {
        let mut kb = Keyboard::new();
        kb.set_key(0xC, true).unwrap();
        kb.set_key(0x3, true).unwrap();
        assert_eq!(kb.first_pressed(), Some(0x3));
        kb.set_key(0x3, false).unwrap();
        assert_eq!(kb.first_pressed(), Some(0xC));
    }
}
