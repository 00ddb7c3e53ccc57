use chipvm::{Config, Emulator};

pub fn words_to_bytes(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_be_bytes()).collect()
}

pub fn load(program: &[u16]) -> Emulator {
    let mut emu = Emulator::new(Config::default().with_seed(0x5eed));
    emu.load_rom(&words_to_bytes(program))
        .expect("test program fits in memory");
    emu
}

pub fn run(emu: &mut Emulator, steps: usize) {
    for _ in 0..steps {
        emu.step().expect("step failed");
    }
}
