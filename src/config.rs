use crate::constants::MAX_SAVED_STATES;

/// Behaviour variants for instructions that historical interpreters disagree on.
///
/// The defaults match the common modern interpretation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Quirks {
    /// 8xy6 / 8xyE shift Vy into Vx rather than shifting Vx in place
    pub shift_reads_vy: bool,
    /// Fx55 / Fx65 leave I pointing one past the last register transferred
    pub load_store_advances_i: bool,
}

/// # Config
/// Runtime configuration of a single Chip-8 instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How many past states are kept for `rewind`; 0 disables history
    pub history_capacity: usize,
    /// Fixed seed for the random number source, `None` seeds from the OS
    pub rng_seed: Option<u64>,
    pub quirks: Quirks,
}

impl Config {
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_capacity: MAX_SAVED_STATES,
            rng_seed: None,
            quirks: Quirks::default(),
        }
    }
}
