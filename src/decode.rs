use std::fmt;

use crate::error::{Error, Result};
use crate::memory::TypeAddr;

pub struct RawInstruction {
    code: u16,
    i: u8,
}

impl RawInstruction {
    pub fn new(code: u16) -> Self {
        RawInstruction { code, i: 1 }
    }

    // n is starting digit (1-based, from the left), m is length
    pub fn nth_m_digits(&self, n: u8, m: u8) -> u16 {
        // 0110 1100 1111 0001
        // -------------------
        // 1111 1111 1111 1111
        //      1111 1111 1111
        //           1111 1111
        //                1111
        let shift_places = (4 - m - (n - 1)) * 4;
        let mask = (1u32 << (m * 4)) - 1;
        ((self.code as u32 >> shift_places) & mask) as u16
    }

    // iterator like methods for decoding convenience
    pub fn start_identifier(&mut self) -> u8 {
        debug_assert_eq!(self.i, 1);
        self.take(1) as u8
    }

    pub fn next_register(&mut self) -> u8 {
        self.take(1) as u8
    }

    pub fn next_address(&mut self) -> TypeAddr {
        self.take(3)
    }

    pub fn next_u8(&mut self) -> u8 {
        self.take(2) as u8
    }

    pub fn next_u4(&mut self) -> u8 {
        self.take(1) as u8
    }

    fn take(&mut self, m: u8) -> u16 {
        debug_assert!(self.i + m <= 5, "read past the end of {:04x}", self.code);
        let digits = self.nth_m_digits(self.i, m);
        self.i += m;
        digits
    }
}

/// One variant per instruction. Operand order follows the encoding: `x`, `y`,
/// then the immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCodes {
    // 00E0
    // turn all pixels to 0
    ClearScreen,
    // 00EE
    PopSubroutine,
    // 1NNN
    // set PC to address NNN, "jump" to memory location
    Jump(TypeAddr),
    // 2NNN
    PushSubroutine(TypeAddr),

    // 3XNN
    SkipEqualConstant(u8, u8),
    // 4XNN
    SkipNotEqualConstant(u8, u8),
    // 5XY_, low nibble ignored
    SkipEqualRegister(u8, u8),

    // 6XNN
    SetRegister(u8, u8),
    // 7XNN
    // add value NN to VX, VF untouched
    AddToRegister(u8, u8),

    // 8XY0
    CopyRegister(u8, u8),
    // 8XY1
    Or(u8, u8),
    // 8XY2
    And(u8, u8),
    // 8XY3
    XOr(u8, u8),
    // 8XY4
    // VF = carry
    Add(u8, u8),
    // 8XY5
    // VF = VX >= VY
    SubtractForward(u8, u8),
    // 8XY6
    // VF = old bit 0 of VX
    RightShift(u8, u8),
    // 8XY7
    // VF = VY >= VX
    SubtractBackward(u8, u8),
    // 8XYE
    // VF = old bit 7 of VX
    LeftShift(u8, u8),

    // 9XY_, low nibble ignored
    SkipNotEqualRegister(u8, u8),

    // ANNN
    // set index register I to address NNN
    SetIndexRegister(TypeAddr),
    // BNNN
    JumpWithOffset(TypeAddr),
    // CXNN
    Random(u8, u8),
    // DXYN
    // draw an N pixel tall sprite starting at I
    // at Coordinates (VX, VY)
    // XOR pixels on screen using sprite data
    // if pixels on screen were switched OFF: VF set to 1
    Draw(u8, u8, u8),

    // EX9E
    SkipIfPressed(u8),
    // EXA1
    SkipIfNotPressed(u8),

    // FX07
    CopyDelayToRegister(u8),
    // FX0A
    GetKey(u8),
    // FX15
    CopyRegisterToDelay(u8),
    // FX18
    CopyRegisterToSound(u8),
    // FX1E
    AddToIndex(u8),
    // FX29
    PointChar(u8),
    // FX33
    ToDecimal(u8),
    // FX55
    StoreRegisterToMemory(u8),
    // FX65
    LoadRegisterFromMemory(u8),
}

impl OpCodes {
    /// `None` for any encoding outside the instruction set.
    pub fn decode_raw(ins: u16) -> Option<Self> {
        let mut raw = RawInstruction::new(ins);

        let op = match raw.start_identifier() {
            0x0 => match ins {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::PopSubroutine,
                _ => return None,
            },
            0x1 => Self::Jump(raw.next_address()),
            0x2 => Self::PushSubroutine(raw.next_address()),
            0x3 => Self::SkipEqualConstant(raw.next_register(), raw.next_u8()),
            0x4 => Self::SkipNotEqualConstant(raw.next_register(), raw.next_u8()),
            0x5 => Self::SkipEqualRegister(raw.next_register(), raw.next_register()),
            0x6 => Self::SetRegister(raw.next_register(), raw.next_u8()),
            0x7 => Self::AddToRegister(raw.next_register(), raw.next_u8()),
            0x8 => {
                let (x, y) = (raw.next_register(), raw.next_register());
                match raw.next_u4() {
                    0x0 => Self::CopyRegister(x, y),
                    0x1 => Self::Or(x, y),
                    0x2 => Self::And(x, y),
                    0x3 => Self::XOr(x, y),
                    0x4 => Self::Add(x, y),
                    0x5 => Self::SubtractForward(x, y),
                    0x6 => Self::RightShift(x, y),
                    0x7 => Self::SubtractBackward(x, y),
                    0xE => Self::LeftShift(x, y),
                    _ => return None,
                }
            }
            0x9 => Self::SkipNotEqualRegister(raw.next_register(), raw.next_register()),
            0xA => Self::SetIndexRegister(raw.next_address()),
            0xB => Self::JumpWithOffset(raw.next_address()),
            0xC => Self::Random(raw.next_register(), raw.next_u8()),
            0xD => Self::Draw(raw.next_register(), raw.next_register(), raw.next_u4()),
            0xE => {
                let x = raw.next_register();
                match raw.next_u8() {
                    0x9E => Self::SkipIfPressed(x),
                    0xA1 => Self::SkipIfNotPressed(x),
                    _ => return None,
                }
            }
            0xF => {
                let x = raw.next_register();
                match raw.next_u8() {
                    0x07 => Self::CopyDelayToRegister(x),
                    0x0A => Self::GetKey(x),
                    0x15 => Self::CopyRegisterToDelay(x),
                    0x18 => Self::CopyRegisterToSound(x),
                    0x1E => Self::AddToIndex(x),
                    0x29 => Self::PointChar(x),
                    0x33 => Self::ToDecimal(x),
                    0x55 => Self::StoreRegisterToMemory(x),
                    0x65 => Self::LoadRegisterFromMemory(x),
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(op)
    }
}

/// Decodes `ins`, fetched at `pc`. The pc only feeds the error report.
pub fn decode(ins: u16, pc: TypeAddr) -> Result<OpCodes> {
    OpCodes::decode_raw(ins).ok_or(Error::UnrecognizedOpcode { opcode: ins, pc })
}

impl fmt::Display for OpCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ClearScreen => write!(f, "CLS"),
            Self::PopSubroutine => write!(f, "RET"),
            Self::Jump(addr) => write!(f, "JP {addr:#05x}"),
            Self::PushSubroutine(addr) => write!(f, "CALL {addr:#05x}"),
            Self::SkipEqualConstant(x, nn) => write!(f, "SE V{x:X}, {nn:#04x}"),
            Self::SkipNotEqualConstant(x, nn) => write!(f, "SNE V{x:X}, {nn:#04x}"),
            Self::SkipEqualRegister(x, y) => write!(f, "SE V{x:X}, V{y:X}"),
            Self::SetRegister(x, nn) => write!(f, "LD V{x:X}, {nn:#04x}"),
            Self::AddToRegister(x, nn) => write!(f, "ADD V{x:X}, {nn:#04x}"),
            Self::CopyRegister(x, y) => write!(f, "LD V{x:X}, V{y:X}"),
            Self::Or(x, y) => write!(f, "OR V{x:X}, V{y:X}"),
            Self::And(x, y) => write!(f, "AND V{x:X}, V{y:X}"),
            Self::XOr(x, y) => write!(f, "XOR V{x:X}, V{y:X}"),
            Self::Add(x, y) => write!(f, "ADD V{x:X}, V{y:X}"),
            Self::SubtractForward(x, y) => write!(f, "SUB V{x:X}, V{y:X}"),
            Self::RightShift(x, _) => write!(f, "SHR V{x:X}"),
            Self::SubtractBackward(x, y) => write!(f, "SUBN V{x:X}, V{y:X}"),
            Self::LeftShift(x, _) => write!(f, "SHL V{x:X}"),
            Self::SkipNotEqualRegister(x, y) => write!(f, "SNE V{x:X}, V{y:X}"),
            Self::SetIndexRegister(addr) => write!(f, "LD I, {addr:#05x}"),
            Self::JumpWithOffset(addr) => write!(f, "JP V0, {addr:#05x}"),
            Self::Random(x, nn) => write!(f, "RND V{x:X}, {nn:#04x}"),
            Self::Draw(x, y, n) => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            Self::SkipIfPressed(x) => write!(f, "SKP V{x:X}"),
            Self::SkipIfNotPressed(x) => write!(f, "SKNP V{x:X}"),
            Self::CopyDelayToRegister(x) => write!(f, "LD V{x:X}, DT"),
            Self::GetKey(x) => write!(f, "LD V{x:X}, K"),
            Self::CopyRegisterToDelay(x) => write!(f, "LD DT, V{x:X}"),
            Self::CopyRegisterToSound(x) => write!(f, "LD ST, V{x:X}"),
            Self::AddToIndex(x) => write!(f, "ADD I, V{x:X}"),
            Self::PointChar(x) => write!(f, "LD F, V{x:X}"),
            Self::ToDecimal(x) => write!(f, "LD B, V{x:X}"),
            Self::StoreRegisterToMemory(x) => write!(f, "LD [I], V0-V{x:X}"),
            Self::LoadRegisterFromMemory(x) => write!(f, "LD V0-V{x:X}, [I]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_manip() {
        assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(2, 1), 0xC);
        assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(3, 1), 0xE);
        assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(1, 1), 0x4);

        assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(1, 2), 0x4C);
        assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(2, 2), 0xCE);
        assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(2, 3), 0xCEE);
        assert_eq!(RawInstruction::new(0x4CEE).nth_m_digits(1, 4), 0x4CEE);
    }

    #[test]
    fn operand_fields() {
        assert_eq!(OpCodes::decode_raw(0x00E0), Some(OpCodes::ClearScreen));
        assert_eq!(OpCodes::decode_raw(0x00EE), Some(OpCodes::PopSubroutine));
        assert_eq!(OpCodes::decode_raw(0x1ABC), Some(OpCodes::Jump(0xABC)));
        assert_eq!(OpCodes::decode_raw(0x2300), Some(OpCodes::PushSubroutine(0x300)));
        assert_eq!(OpCodes::decode_raw(0x3A42), Some(OpCodes::SkipEqualConstant(0xA, 0x42)));
        assert_eq!(OpCodes::decode_raw(0x6005), Some(OpCodes::SetRegister(0, 5)));
        assert_eq!(OpCodes::decode_raw(0x8014), Some(OpCodes::Add(0, 1)));
        assert_eq!(OpCodes::decode_raw(0x8AB7), Some(OpCodes::SubtractBackward(0xA, 0xB)));
        assert_eq!(OpCodes::decode_raw(0x812E), Some(OpCodes::LeftShift(1, 2)));
        assert_eq!(OpCodes::decode_raw(0xB123), Some(OpCodes::JumpWithOffset(0x123)));
        assert_eq!(OpCodes::decode_raw(0xD125), Some(OpCodes::Draw(1, 2, 5)));
        assert_eq!(OpCodes::decode_raw(0xE59E), Some(OpCodes::SkipIfPressed(5)));
        assert_eq!(OpCodes::decode_raw(0xE5A1), Some(OpCodes::SkipIfNotPressed(5)));
        assert_eq!(OpCodes::decode_raw(0xF30A), Some(OpCodes::GetKey(3)));
        assert_eq!(OpCodes::decode_raw(0xFF65), Some(OpCodes::LoadRegisterFromMemory(0xF)));
    }

    #[test]
    fn register_skips_ignore_low_nibble() {
        assert_eq!(OpCodes::decode_raw(0x5123), Some(OpCodes::SkipEqualRegister(1, 2)));
        assert_eq!(OpCodes::decode_raw(0x9120), Some(OpCodes::SkipNotEqualRegister(1, 2)));
    }

    #[test]
    fn unknown_encodings_are_reported() {
        for word in [0x0000, 0x0123, 0x00E1, 0x8008, 0x800F, 0xE000, 0xF000, 0xF0FF] {
            assert_eq!(OpCodes::decode_raw(word), None, "{word:#06x}");
        }
        assert_eq!(
            decode(0x800F, 0x2A4),
            Err(Error::UnrecognizedOpcode {
                opcode: 0x800F,
                pc: 0x2A4
            })
        );
    }

    #[test]
    fn mnemonics() {
        assert_eq!(OpCodes::Draw(1, 2, 5).to_string(), "DRW V1, V2, 5");
        assert_eq!(OpCodes::SetIndexRegister(0x2F0).to_string(), "LD I, 0x2f0");
        assert_eq!(OpCodes::StoreRegisterToMemory(0xA).to_string(), "LD [I], V0-VA");
    }
}
