use thiserror::Error;

/// Everything that can go wrong while loading or running a Chip-8 program.
///
/// None of these are recovered from internally; the caller decides whether to
/// halt, reset or rewind the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("write to interpreter-reserved memory at address {address:#06X}")]
    ReservedWrite { address: usize },

    #[error("stack overflow: more than {depth} nested subroutine calls")]
    StackOverflow { depth: usize },

    #[error("stack underflow: return from a subroutine with an empty call stack")]
    StackUnderflow,

    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("invalid key code {key:#04X}, keys are 0x0..=0xF")]
    InvalidKey { key: u8 },
}
