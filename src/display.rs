use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// The raw pixel rows of a frame. Bit 63 of a row is its leftmost pixel.
pub type PixelRows = [u64; DISPLAY_HEIGHT];

/// # FrameBuffer
/// The Chip-8 display is composed of 64x32 black/white pixels.
///
/// Each of the 32 rows is stored as a single u64 so that drawing a sprite row
/// is one rotate and one XOR. Pixels are only ever toggled by `draw` or
/// switched off all at once by `clear`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    rows: PixelRows,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            rows: [0; DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.rows = [0; DISPLAY_HEIGHT];
    }

    /// XORs `sprite` onto the frame with its top left corner at `x`, `y`.
    ///
    /// Coordinates are taken modulo the display size. Sprite columns that run
    /// past the right edge wrap around to the left; sprite rows that run past
    /// the bottom edge are clipped.
    ///
    /// Returns true if any pixel was switched off.
    pub fn draw(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let x = (x % DISPLAY_WIDTH) as u32;
        let y = y % DISPLAY_HEIGHT;
        let mut collision = false;

        for (row, &byte) in self.rows[y..].iter_mut().zip(sprite) {
            // move the byte to the left edge, then rotate it into place so it wraps
            let mask = (u64::from(byte) << (DISPLAY_WIDTH - 8)).rotate_right(x);
            collision |= *row & mask != 0;
            *row ^= mask;
        }

        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let row = self.rows[y % DISPLAY_HEIGHT];
        row >> (DISPLAY_WIDTH - 1 - x % DISPLAY_WIDTH) & 1 == 1
    }

    pub fn pixel_rows(&self) -> &PixelRows {
        &self.rows
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
