use crate::memory::TypeAddr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("program of {size} bytes does not fit in {capacity} bytes of program memory")]
    ProgramTooLarge { size: usize, capacity: usize },
    #[error("unrecognized opcode {opcode:#06x} at pc {pc:#05x}")]
    UnrecognizedOpcode { opcode: u16, pc: TypeAddr },
    #[error("stack overflow: call at pc {pc:#05x} exceeds 16 nested subroutines")]
    StackOverflow { pc: TypeAddr },
    #[error("stack underflow: return at pc {pc:#05x} with an empty stack")]
    StackUnderflow { pc: TypeAddr },
    #[error("key {0:#x} is outside the 16-key keypad")]
    InvalidKey(u8),
}
