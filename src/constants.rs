/// Total addressable memory in bytes.
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded here; everything below is reserved for the interpreter.
pub const PROGRAM_START: u16 = 0x200;

/// The largest program that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Where the built-in hex digit sprites live.
pub const FONT_ADDR: u16 = 0x000;

/// Every font glyph is 5 rows tall.
pub const FONT_GLYPH_SIZE: u16 = 5;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Nested subroutine calls allowed before a call overflows the stack.
pub const STACK_DEPTH: usize = 16;

pub const KEY_COUNT: usize = 16;

/// Nanoseconds per CPU cycle; roughly 500Hz.
pub const CLOCK_SPEED: u64 = 2_000_000;

/// The timers should be decremented at 60Hz, approximated as once every 8 CPU cycles.
pub const CPU_CYCLES_PER_TIMER_CYCLE: u32 = 8;

/// How many past states are kept around for rewinding by default.
pub const MAX_SAVED_STATES: usize = 600;

/// # Sprite Sheet
/// Sprites for the hexadecimal digits 0..F, 8x5 pixels each.
///
/// Only the high nibble of every row is lit, e.g. `0`:
/// ```text
/// ****    11110000    0xF0
/// *  *    10010000    0x90
/// *  *    10010000    0x90
/// *  *    10010000    0x90
/// ****    11110000    0xF0
/// ```
#[rustfmt::skip]
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
