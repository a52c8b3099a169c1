use std::collections::VecDeque;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::constants::MEMORY_SIZE;
use crate::display::PixelRows;
use crate::error::Chip8Error;
use crate::instruction;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::operations::Context;
use crate::state::State;

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - `keypad` with public interfaces for manipulating it
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - advancing and reversing the CPU
/// - advancing its timers
/// - inspecting its registers, memory and frame buffer for rendering by some display
///
/// The machine never keeps time on its own. The caller drives `tick` at the
/// CPU rate and `decrement_timers` at ~60Hz, serializing all calls itself.
pub struct Chip8 {
    state: State,
    power_on_state: State,
    previous_states: VecDeque<State>,
    keypad: Keypad,
    rng: StdRng,
    config: Config,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8 {
            state: State::new(),
            power_on_state: State::new(),
            previous_states: VecDeque::with_capacity(config.history_capacity),
            keypad: Keypad::new(),
            rng,
            config,
        }
    }

    /// Load a program into memory at `PROGRAM_START`
    ///
    /// The machine is put back into its power-on state first, so nothing of a
    /// previously running program survives. If the program is too large the
    /// machine is left exactly as it was.
    ///
    /// # Arguments
    /// * `program` the raw bytes of a ROM
    pub fn load(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        let mut state = State::new();
        state.memory.load(program)?;
        debug!("loaded {} byte program", program.len());
        self.power_on_state = state;
        self.restore(state);
        self.previous_states.clear();
        Ok(())
    }

    /// Returns the machine to the state it was in right after the last `load`
    pub fn reset(&mut self) {
        debug!("reset");
        self.restore(self.power_on_state);
        self.previous_states.clear();
    }

    /// Advances the CPU by a single cycle
    /// - polls the keypad if awaiting a keypress
    /// - otherwise gets, decodes and executes the next opcode
    ///
    /// Returns the instruction word that was executed, or 0 if the machine is
    /// still waiting on a key. On error nothing about the machine has changed.
    pub fn tick(&mut self) -> Result<u16, Chip8Error> {
        if let Some(register) = self.state.register_needing_key {
            return self.poll_key(register);
        }

        let op = self.get_op()?;
        let instruction = instruction::from_op(op)?;
        self.trace(op, instruction.mnemonic);

        let mut ctx = Context {
            keypad: &self.keypad,
            rng: &mut self.rng,
            quirks: self.config.quirks,
        };
        let next = (instruction.execute)(op, &self.state, &mut ctx)?;
        if let Some(register) = next.register_needing_key {
            debug!("V{:X} awaiting a keypress", register);
        }
        self.advance_to(next);
        Ok(op.0)
    }

    /// Finishes a pending key wait if any key is down
    fn poll_key(&mut self, register: u8) -> Result<u16, Chip8Error> {
        let key = match self.keypad.first_pressed() {
            Some(key) => key,
            None => return Ok(0),
        };
        let op = self.get_op()?;
        self.trace(op, instruction::from_op(op)?.mnemonic);
        debug!("V{:X} received key {:X}", register, key);

        let mut v = self.state.v;
        v[register as usize] = key;
        let next = State {
            pc: self.state.next_pc(),
            v,
            register_needing_key: None,
            ..self.state
        };
        self.advance_to(next);
        Ok(op.0)
    }

    /// Decrements the delay and sound timers toward 0
    pub fn decrement_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Reverses the CPU by a single cycle if possible
    /// - if there are previous_states, pops the last one and restores it
    ///
    /// Returns whether a state was restored
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                debug!("rewound to pc {:04X}", state.pc);
                self.restore(state);
                true
            }
            None => false,
        }
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the code of the key, 0x0..=0xF
    /// * `pressed` whether it is currently held down
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<(), Chip8Error> {
        self.keypad.set(key, pressed)
    }

    pub fn key_press(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.set_key(key, true)
    }

    pub fn key_release(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.set_key(key, false)
    }

    pub fn is_pressed(&self, key: u8) -> Result<bool, Chip8Error> {
        self.keypad.is_pressed(key)
    }

    /// Returns the pixel rows if the display changed since the last call
    pub fn take_frame(&mut self) -> Option<PixelRows> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(*self.state.frame_buffer.pixel_rows())
        } else {
            None
        }
    }

    pub fn pixel_rows(&self) -> &PixelRows {
        self.state.frame_buffer.pixel_rows()
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.state.v
    }

    pub fn index(&self) -> u16 {
        self.state.i
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    /// Return addresses of the subroutines currently being executed, outermost first
    pub fn stack(&self) -> &[u16] {
        &self.state.stack[..self.state.sp]
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Whether a tone should currently be playing
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// The register waiting on a keypress, if the machine is blocked on one
    pub fn awaiting_key(&self) -> Option<u8> {
        self.state.register_needing_key
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        self.state.memory.as_bytes()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decodes the instruction at `addr` without executing it
    pub fn disassemble(&self, addr: u16) -> Result<(Opcode, &'static str), Chip8Error> {
        let op = self.fetch(addr)?;
        let instruction = instruction::from_op(op)?;
        Ok((op, instruction.mnemonic))
    }

    /// Replaces the current state, keeping the old one in previous_states
    /// - if there are already `history_capacity` saved then the oldest is dropped
    fn advance_to(&mut self, next: State) {
        if self.config.history_capacity > 0 {
            if self.previous_states.len() == self.config.history_capacity {
                self.previous_states.pop_back();
            }
            self.previous_states.push_front(self.state);
        }
        self.state = next;
    }

    /// Swaps in a state from outside the normal cycle (history or power-on)
    /// - a frame that differs from the replaced one, or one not yet taken, is flagged for drawing
    fn restore(&mut self, state: State) {
        let changed = state.frame_buffer != self.state.frame_buffer;
        let draw_flag = self.state.draw_flag || changed;
        self.state = State { draw_flag, ..state };
    }

    fn trace(&self, op: Opcode, mnemonic: &str) {
        trace!(
            "{:04X} {} {:<6} v{:02X?} i{:04X}",
            self.state.pc,
            op,
            mnemonic,
            self.state.v,
            self.state.i
        );
    }

    /// Gets the opcode currently pointed at by the pc.
    fn get_op(&self) -> Result<Opcode, Chip8Error> {
        self.fetch(self.state.pc)
    }

    fn fetch(&self, addr: u16) -> Result<Opcode, Chip8Error> {
        let high = self.state.memory.read(addr)?;
        let low = self.state.memory.read(addr + 1)?;
        Ok(Opcode::from_bytes(high, low))
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
