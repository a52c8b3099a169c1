pub use chip8::Chip8;
pub use config::{Config, Quirks};
pub use constants::{CLOCK_SPEED, CPU_CYCLES_PER_TIMER_CYCLE};
pub use display::PixelRows;
pub use error::Chip8Error;
pub use opcode::Opcode;

mod chip8;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
mod instruction;
pub mod keypad;
pub mod memory;
pub mod opcode;
mod operations;
mod state;
