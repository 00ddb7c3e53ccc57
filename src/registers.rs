use crate::memory::TypeAddr;

pub const REGISTER_COUNT: usize = 16;
/// VF doubles as the carry/borrow/collision output of several instructions.
pub const FLAG_REGISTER: u8 = 0xF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    registers: [u8; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
    }

    // register indices come from a nibble, mask anyway so a bad caller can't panic
    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[(reg_num & 0xF) as usize] = value;
    }

    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let reg = &mut self.registers[(reg_num & 0xF) as usize];
        *reg = reg.wrapping_add(value);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[(reg_num & 0xF) as usize]
    }

    /// Writes VF. Callers compute the flag from pre-operation values and call this
    /// after the destination write, so the flag wins when the destination is VF.
    pub fn set_flag(&mut self, flag: bool) {
        self.set_register(FLAG_REGISTER, flag as u8);
    }

    pub fn flag(&self) -> u8 {
        self.get(FLAG_REGISTER)
    }

    pub fn as_slice(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.wrapping_sub(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }

    pub fn add(&mut self, offset: u8) {
        self.0 = self.0.wrapping_add(offset as TypeAddr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_register_wraps() {
        let mut regs = Registers::new();
        regs.set_register(3, 0xFE);
        regs.add_to_register(3, 5);
        assert_eq!(regs.get(3), 3);
        assert_eq!(regs.flag(), 0, "add-imm never touches VF");
    }

    #[test]
    fn flag_aliases_vf() {
        let mut regs = Registers::new();
        regs.set_register(0xF, 9);
        regs.set_flag(true);
        assert_eq!(regs.get(0xF), 1);
        regs.set_flag(false);
        assert_eq!(regs.as_slice()[15], 0);
    }

    #[test]
    fn pc_steps_by_two() {
        let mut pc = ProgramCounter(0x200);
        pc.increment();
        pc.increment();
        pc.decrement();
        assert_eq!(pc.0, 0x202);
    }

    #[test]
    fn index_add_wraps_at_16_bits() {
        let mut index = IndexRegister(0xFFFF);
        index.add(2);
        assert_eq!(index.0, 1);
    }
}
