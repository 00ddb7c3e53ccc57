use crate::timer::TIMER_DEC_PER_SECOND;

/// Instructions per second when nothing else is asked for.
pub const DEFAULT_IPS: u32 = 700;

/// What the host does when the interpreter hits an encoding it doesn't know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OpcodePolicy {
    /// Stop the run and report the error.
    #[default]
    Halt,
    /// Step over the word silently.
    Skip,
    /// Log the word, then step over it.
    Log,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Instructions executed between two timer ticks.
    pub instructions_per_frame: u32,
    pub timer_hz: u32,
    /// Seed for the random source; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub opcode_policy: OpcodePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instructions_per_frame: DEFAULT_IPS / TIMER_DEC_PER_SECOND,
            timer_hz: TIMER_DEC_PER_SECOND,
            seed: None,
            opcode_policy: OpcodePolicy::Halt,
        }
    }
}

impl Config {
    /// Splits an instructions-per-second rate over the timer frames, at least
    /// one instruction per frame.
    pub fn with_ips(mut self, ips: u32) -> Self {
        self.instructions_per_frame = (ips / self.timer_hz.max(1)).max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
