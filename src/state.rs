use crate::constants::{PROGRAM_START, STACK_DEPTH};
use crate::display::FrameBuffer;
use crate::memory::Memory;

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, always pointing at the next instruction to fetch
///
/// Stack
/// - `STACK_DEPTH` return addresses; `sp` is the number currently in use
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented by the caller at ~60Hz
///
/// ## Memory
/// - 4096 bytes of addressable memory
/// - a 64x32 frame buffer
///
/// ## Input
/// - Emulation halts while `register_needing_key` names a register awaiting a keypress
///
/// Operations never mutate a State in place, they build the next one from it.
/// A failed operation therefore leaves the previous State untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: Memory,
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub register_needing_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory: Memory::new(),
            frame_buffer: FrameBuffer::new(),
            draw_flag: false,
            register_needing_key: None,
        }
    }

    /// The address of the instruction after the current one
    pub fn next_pc(&self) -> u16 {
        self.pc + 0x2
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
