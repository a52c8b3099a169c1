use crate::constants::KEY_COUNT;
use crate::error::Chip8Error;

/// # Keypad
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
///
/// The keypad only latches what the caller reports; mapping physical keys to
/// codes 0x0..=0xF happens outside the interpreter.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Keypad {
    pressed: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: u8, pressed: bool) -> Result<(), Chip8Error> {
        let slot = self
            .pressed
            .get_mut(key as usize)
            .ok_or(Chip8Error::InvalidKey { key })?;
        *slot = pressed;
        Ok(())
    }

    pub fn is_pressed(&self, key: u8) -> Result<bool, Chip8Error> {
        self.pressed
            .get(key as usize)
            .copied()
            .ok_or(Chip8Error::InvalidKey { key })
    }

    /// The lowest key code currently held down, if any.
    pub fn first_pressed(&self) -> Option<u8> {
        self.pressed.iter().position(|&p| p).map(|key| key as u8)
    }
}
