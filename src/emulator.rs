use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::{Config, OpcodePolicy},
    decode::{decode, OpCodes},
    display::{Frame, FrameBuffer},
    error::{Error, Result},
    keyboard::Keyboard,
    memory::{Memory, TypeAddr, FONT_START, GLYPH_HEIGHT},
    registers::Registers,
    timer::Timer,
};

/// Sprites are at most 15 rows tall (the height is a nibble).
const MAX_SPRITE_ROWS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Parked on `FX0A`; PC still points at that instruction and the key goes
    /// into the held register.
    AwaitingKey(u8),
}

pub struct Emulator {
    fb: FrameBuffer,
    pub regs: Registers,
    pub mem: Memory,
    pub keyboard: Keyboard,
    pub delay_timer: Timer,
    pub sound_timer: Timer,
    state: RunState,
    rng: StdRng,
    config: Config,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Emulator {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            keyboard: Keyboard::new(),
            delay_timer: Timer::new(0),
            sound_timer: Timer::new(0),
            state: RunState::Running,
            rng,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        self.mem.load_rom(rom)
    }

    /// Back to power-on state with the loaded program still in place. The key
    /// latch is left alone, it mirrors the physical keys.
    pub fn reset(&mut self) {
        self.mem.reset();
        self.regs.reset();
        self.fb.clear_buffer();
        self.delay_timer = Timer::new(0);
        self.sound_timer = Timer::new(0);
        self.state = RunState::Running;
        debug!("machine reset");
    }

    /// Executes one instruction and returns whether the framebuffer changed.
    ///
    /// While parked on a key wait this only polls the key latch. A failed step
    /// leaves PC on the offending instruction.
    pub fn step(&mut self) -> Result<bool> {
        if let RunState::AwaitingKey(vx) = self.state {
            self.poll_key(vx);
            return Ok(false);
        }

        let pc = self.mem.pc.0;
        let ins = self.mem.next_instruction();
        let result = decode(ins, pc).and_then(|op| {
            trace!("{pc:#05x}: {ins:04x} {op}");
            self.execute_ins(op, pc)
        });
        if result.is_err() {
            self.mem.set_pc(pc);
        }
        result
    }

    /// Moves PC past the current word. Used by hosts that choose to continue
    /// after an unrecognized opcode.
    pub fn skip_instruction(&mut self) {
        self.mem.increment_pc();
    }

    /// Advances both countdown timers by one fixed interval.
    pub fn tick(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// One timer frame: `instructions_per_frame` steps, then a tick.
    ///
    /// Unrecognized opcodes are handled per the configured [`OpcodePolicy`];
    /// every other error ends the frame without ticking.
    pub fn run_frame(&mut self) -> Result<bool> {
        let mut redraw = false;
        for _ in 0..self.config.instructions_per_frame {
            match self.step() {
                Ok(changed) => redraw |= changed,
                Err(Error::UnrecognizedOpcode { opcode, pc })
                    if self.config.opcode_policy != OpcodePolicy::Halt =>
                {
                    if self.config.opcode_policy == OpcodePolicy::Log {
                        warn!("skipping unrecognized opcode {opcode:#06x} at {pc:#05x}");
                    }
                    self.skip_instruction();
                }
                Err(err) => return Err(err),
            }
        }
        self.tick();
        Ok(redraw)
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        self.keyboard.set_key(key, pressed)
    }

    pub fn take_frame(&mut self) -> (Frame, bool) {
        self.fb.take_frame()
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn pc(&self) -> TypeAddr {
        self.mem.pc.0
    }

    pub fn index(&self) -> TypeAddr {
        self.mem.index.0
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer.is_active()
    }

    fn poll_key(&mut self, vx: u8) {
        if let Some(key) = self.keyboard.first_pressed() {
            self.regs.set_register(vx, key);
            self.mem.increment_pc();
            self.state = RunState::Running;
            debug!("key {key:x} released wait into V{vx:X}");
        }
    }

    /// `pc` is the address `op` was fetched from; PC itself already points at
    /// the next instruction.
    fn execute_ins(&mut self, op: OpCodes, pc: TypeAddr) -> Result<bool> {
        match op {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
                return Ok(true);
            }
            OpCodes::PopSubroutine => {
                // the pushed address is already past the call
                let addr = self.mem.stack.pop(pc)?;
                self.mem.set_pc(addr);
            }
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::PushSubroutine(addr) => {
                self.mem.stack.push(self.mem.pc.0, pc)?;
                self.mem.set_pc(addr);
            }
            OpCodes::SkipEqualConstant(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            // Flags below are computed from the operands before anything is
            // written, and VF is written last.
            OpCodes::Add(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let (sum, carry) = x.overflowing_add(y);
                self.regs.set_register(vx, sum);
                self.regs.set_flag(carry);
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let no_borrow = x >= y;
                self.regs.set_register(vx, x.wrapping_sub(y));
                self.regs.set_flag(no_borrow);
            }
            OpCodes::RightShift(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set_register(vx, x >> 1);
                self.regs.set_flag(x & 1 == 1);
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let no_borrow = y >= x;
                self.regs.set_register(vx, y.wrapping_sub(x));
                self.regs.set_flag(no_borrow);
            }
            OpCodes::LeftShift(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set_register(vx, x << 1);
                self.regs.set_flag(x >> 7 == 1);
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::JumpWithOffset(addr) => {
                self.mem
                    .set_pc(addr.wrapping_add(self.regs.get(0) as TypeAddr));
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, ransuu & nn);
            }
            OpCodes::Draw(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                // From I to I + N, plot I at VX, VY
                let rows = (height as usize).min(MAX_SPRITE_ROWS);
                let mut sprite = [0u8; MAX_SPRITE_ROWS];
                for (i, row) in sprite.iter_mut().take(rows).enumerate() {
                    *row = self.mem.get(self.mem.index.0.wrapping_add(i as TypeAddr));
                }
                let vf = self.fb.paint(x, y, &sprite[..rows]);
                self.regs.set_flag(vf);
                return Ok(true);
            }
            OpCodes::SkipIfPressed(vx) => {
                if self.keyboard.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                if !self.keyboard.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => {
                self.regs.set_register(vx, self.delay_timer.count);
            }
            OpCodes::GetKey(vx) => match self.keyboard.first_pressed() {
                Some(key) => self.regs.set_register(vx, key),
                None => {
                    self.mem.decrement_pc();
                    self.state = RunState::AwaitingKey(vx);
                    debug!("waiting for a key into V{vx:X} at {pc:#05x}");
                }
            },
            OpCodes::CopyRegisterToDelay(vx) => self.delay_timer.set(self.regs.get(vx)),
            OpCodes::CopyRegisterToSound(vx) => self.sound_timer.set(self.regs.get(vx)),
            OpCodes::AddToIndex(vx) => {
                self.mem.index.add(self.regs.get(vx));
            }
            OpCodes::PointChar(vx) => {
                let char = self.regs.get(vx) as TypeAddr;
                self.mem.set_index(FONT_START + char * GLYPH_HEIGHT as TypeAddr);
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let i = self.mem.index.0;
                self.mem.store(i, value / 100);
                self.mem.store(i.wrapping_add(1), (value / 10) % 10);
                self.mem.store(i.wrapping_add(2), value % 10);
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.regs.get(reg);
                    self.mem
                        .store(self.mem.index.0.wrapping_add(reg as TypeAddr), reg_val);
                }
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.mem.get(self.mem.index.0.wrapping_add(reg as TypeAddr));
                    self.regs.set_register(reg, reg_val);
                }
            }
        }
        Ok(false)
    }
}
