use log::{debug, trace};

use crate::error::{Error, Result};
use crate::registers::{IndexRegister, ProgramCounter};

pub type TypeAddr = u16; // in reality u12

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const PROGRAM_CAPACITY: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_DEPTH: usize = 16;

/// Glyphs sit at the very start of memory, so glyph `n` lives at `n * GLYPH_HEIGHT`.
pub const FONT_START: TypeAddr = 0x000;
pub const GLYPH_HEIGHT: u8 = 5;

type FontBytes = [u8; GLYPH_HEIGHT as usize * 16];

const DEFAULT_FONT: FontBytes = [
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

/// Address space, program counter, index register and call stack.
///
/// Every byte access wraps modulo [`MEMORY_SIZE`], so no address a program can
/// compute is out of bounds.
#[derive(Debug, Clone)]
pub struct Memory {
    // 0x000 -> 0x04F font, 0x050 -> 0x1FF unused, 0x200 -> 0xFFF program and data
    bytes: [u8; MEMORY_SIZE],
    // 0x200 -> 0xFFF as it stood right after the last load, restored by `reset`
    image: Vec<u8>,
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: [0; MEMORY_SIZE],
            image: Vec::new(),
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0x0),
            stack: Stack::new(),
        };
        mem.load_font();
        mem
    }

    fn load_font(&mut self) {
        let start = FONT_START as usize;
        self.bytes[start..start + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
    }

    /// Memory as it was right after the last `load_rom`, including bytes an
    /// earlier, longer program left past the end of the current one.
    pub fn reset(&mut self) {
        self.bytes = [0; MEMORY_SIZE];
        self.load_font();
        let start = PROGRAM_START as usize;
        self.bytes[start..start + self.image.len()].copy_from_slice(&self.image);
        self.pc = ProgramCounter(PROGRAM_START);
        self.index = IndexRegister(0x0);
        self.stack = Stack::new();
    }

    /// Program-visible write. 0x000 -> 0x1FF belongs to the interpreter, so
    /// writes landing there are dropped.
    pub fn store(&mut self, addr: TypeAddr, val: u8) {
        let addr = addr as usize % MEMORY_SIZE;
        if addr < PROGRAM_START as usize {
            trace!("dropped write of {val:#04x} to reserved {addr:#05x}");
            return;
        }
        self.bytes[addr] = val;
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[addr as usize % MEMORY_SIZE]
    }

    /// Big-endian instruction word at `addr`; the second byte wraps like any other access.
    pub fn read_word(&self, addr: TypeAddr) -> u16 {
        let (l, r) = (self.get(addr), self.get(addr.wrapping_add(1)));
        ((l as u16) << 8) | r as u16
    }

    pub fn increment_pc(&mut self) {
        self.pc.increment();
    }

    pub fn decrement_pc(&mut self) {
        self.pc.decrement();
    }

    /// Fetches the word at PC and advances PC past it.
    pub fn next_instruction(&mut self) -> u16 {
        let ins = self.read_word(self.pc.0);
        self.increment_pc();
        ins
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    // loads program instructions starting at address 0x200
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > PROGRAM_CAPACITY {
            return Err(Error::ProgramTooLarge {
                size: bytes.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        self.image = self.bytes[start..].to_vec();
        debug!("loaded {} byte program at {:#05x}", bytes.len(), PROGRAM_START);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8; MEMORY_SIZE] {
        &self.bytes
    }
}

/// Fixed 16-slot return stack. `sp` counts live frames, so the next push lands
/// in `addresses[sp]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    addresses: [TypeAddr; STACK_DEPTH],
    sp: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    /// `pc` is only used to report where the overflowing call happened.
    pub fn push(&mut self, addr: TypeAddr, pc: TypeAddr) -> Result<()> {
        if self.sp == STACK_DEPTH {
            return Err(Error::StackOverflow { pc });
        }
        self.addresses[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self, pc: TypeAddr) -> Result<TypeAddr> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow { pc });
        }
        self.sp -= 1;
        Ok(self.addresses[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_is_loaded_at_zero() {
        let mem = Memory::new();
        assert_eq!(&mem.as_slice()[..5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph F
        assert_eq!(mem.get(15 * 5 + 4), 0x80);
        assert_eq!(mem.pc.0, PROGRAM_START);
    }

    #[test]
    fn load_rom_copies_at_0x200_and_keeps_font() {
        let mut mem = Memory::new();
        mem.load_rom(&[0xAB, 0xCD, 0xEF]).unwrap();
        assert_eq!(mem.get(0x200), 0xAB);
        assert_eq!(mem.get(0x202), 0xEF);
        assert_eq!(mem.get(0x203), 0);
        assert_eq!(mem.get(0x000), 0xF0);
    }

    #[test]
    fn load_rom_fills_to_the_last_byte() {
        let mut mem = Memory::new();
        let rom = vec![0x11; PROGRAM_CAPACITY];
        mem.load_rom(&rom).unwrap();
        assert_eq!(mem.get(0xFFF), 0x11);
    }

    #[test]
    fn load_rom_rejects_oversized_program() {
        let mut mem = Memory::new();
        let rom = vec![0; MEMORY_SIZE - 0x200 + 1];
        assert_eq!(
            mem.load_rom(&rom),
            Err(Error::ProgramTooLarge {
                size: PROGRAM_CAPACITY + 1,
                capacity: PROGRAM_CAPACITY
            })
        );
        assert_eq!(mem.get(0x200), 0);
    }

    #[test]
    fn addresses_wrap() {
        let mut mem = Memory::new();
        mem.store(0x1200, 0x42);
        assert_eq!(mem.get(0x200), 0x42);
        mem.store(0xFFF, 0x12);
        // second byte comes from the first font row
        assert_eq!(mem.read_word(0xFFF), 0x12F0);
    }

    #[test]
    fn next_instruction_advances_pc() {
        let mut mem = Memory::new();
        mem.load_rom(&[0x60, 0x05, 0x61, 0x03]).unwrap();
        assert_eq!(mem.next_instruction(), 0x6005);
        assert_eq!(mem.next_instruction(), 0x6103);
        assert_eq!(mem.pc.0, 0x204);
    }

    #[test]
    fn reset_restores_program() {
        let mut mem = Memory::new();
        mem.load_rom(&[0x12, 0x34]).unwrap();
        mem.store(0x200, 0);
        mem.store(0x300, 7);
        mem.set_index(0x321);
        mem.stack.push(0x202, 0x200).unwrap();
        mem.reset();
        assert_eq!(mem.read_word(0x200), 0x1234);
        assert_eq!(mem.get(0x300), 0);
        assert_eq!(mem.index.0, 0);
        assert_eq!(mem.stack.depth(), 0);
    }

    #[test]
    fn stores_never_reach_the_font() {
        let mut mem = Memory::new();
        let font = mem.as_slice()[..0x200].to_vec();
        mem.store(0x000, 0xAA);
        mem.store(0x1FF, 0xAA);
        mem.store(0x1000, 0xAA);
        assert_eq!(&mem.as_slice()[..0x200], &font[..]);
        mem.store(0x200, 0xAA);
        assert_eq!(mem.get(0x200), 0xAA);
    }

    #[test]
    fn reset_reproduces_memory_after_last_load() {
        let mut mem = Memory::new();
        mem.load_rom(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        mem.load_rom(&[0x55, 0x66]).unwrap();
        mem.store(0x203, 0);
        mem.store(0x800, 9);
        mem.reset();
        assert_eq!(&mem.as_slice()[0x200..0x205], &[0x55, 0x66, 0x33, 0x44, 0]);
        assert_eq!(mem.get(0x800), 0);
    }

    #[test]
    fn stack_is_bounded() {
        let mut stack = Stack::new();
        for i in 0..STACK_DEPTH as TypeAddr {
            stack.push(0x200 + i * 2, 0x300).unwrap();
        }
        assert_eq!(stack.push(0x400, 0x300), Err(Error::StackOverflow { pc: 0x300 }));
        assert_eq!(stack.depth(), STACK_DEPTH);
        assert_eq!(stack.pop(0x310), Ok(0x21E));
    }

    #[test]
    fn empty_stack_underflows() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(0x204), Err(Error::StackUnderflow { pc: 0x204 }));
        stack.push(0x206, 0x204).unwrap();
        assert_eq!(stack.pop(0x208), Ok(0x206));
        assert_eq!(stack.depth(), 0);
    }
}
