//! Interpreter core for the CHIP-8 virtual machine: 4 KiB of memory, sixteen
//! 8-bit registers, a 16-level call stack, two 60 Hz countdown timers, a
//! 64x32 monochrome framebuffer and a 16-key input latch.
//!
//! The host owns the loop. It feeds key events, calls [`Emulator::step`] as
//! often as its instruction rate wants, calls [`Emulator::tick`] at the timer
//! rate, and redraws when [`Emulator::take_frame`] reports a change.

pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod timer;

pub use config::{Config, OpcodePolicy};
pub use decode::OpCodes;
pub use emulator::{Emulator, RunState};
pub use error::{Error, Result};
