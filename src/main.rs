// Desktop host for the interpreter core: a minifb window for the framebuffer,
// the 1234/QWER/ASDF/ZXCV block for the hex keypad, ESC to quit.
//
// CPU: --ips instructions per second
// Display: at most once per timer frame
// Timer: 60 times per second

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};

use chipvm::config::DEFAULT_IPS;
use chipvm::timer::FrameClock;
use chipvm::{Config, Emulator, OpcodePolicy};

mod keymap;
mod window;

/// Catch-up limit after a stall (window drag, debugger), in timer frames.
const MAX_FRAMES_PER_UPDATE: u32 = 4;

#[derive(Parser, Debug)]
#[command(name = "chipvm", about = "Run a CHIP-8 program in a window.")]
struct Args {
    /// Program image, loaded at 0x200.
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Instructions executed per second.
    #[arg(long, default_value_t = DEFAULT_IPS)]
    ips: u32,

    /// Window scale factor (1, 2, 4, 8, 16 or 32).
    #[arg(long, default_value_t = 16)]
    scale: u32,

    /// Seed for the random number instruction.
    #[arg(long)]
    seed: Option<u64>,

    /// What to do when the program hits an unknown instruction.
    #[arg(long, value_enum, default_value_t = OpcodePolicy::Halt)]
    on_unknown: OpcodePolicy,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default().with_ips(self.ips);
        config.seed = self.seed;
        config.opcode_policy = self.on_unknown;
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("chipvm=info"))
        .init();

    let args = Args::parse();
    let config = args.config();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("failed to read {}", args.rom.display()))?;
    let mut emu = Emulator::new(config);
    emu.load_rom(&rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;
    info!(
        "loaded {} ({} bytes), {} instructions per frame",
        args.rom.display(),
        rom.len(),
        emu.config().instructions_per_frame
    );

    let mut screen = window::Screen::new("chipvm - ESC to exit", args.scale)?;
    let result = run(&mut emu, &mut screen);
    if let Err(err) = &result {
        error!("stopped at pc {:#05x}: {err:#}", emu.pc());
    }
    info!("shutting down");
    result
}

fn run(emu: &mut Emulator, screen: &mut window::Screen) -> Result<()> {
    let mut clock = FrameClock::new(emu.config().timer_hz, Instant::now());
    let mut beeping = false;

    while screen.is_running() {
        for (key, pressed) in keymap::snapshot(&screen.window).into_iter().enumerate() {
            emu.set_key(key as u8, pressed)?;
        }

        let frames = clock.sync(Instant::now());
        for _ in 0..frames.min(MAX_FRAMES_PER_UPDATE) {
            emu.run_frame()?;
        }

        if emu.sound_active() != beeping {
            beeping = !beeping;
            debug!("sound timer {}", if beeping { "started" } else { "expired" });
        }

        let (frame, changed) = emu.take_frame();
        if changed {
            screen.draw(&frame)?;
        } else {
            screen.poll();
        }
        thread::sleep(clock.until_next(Instant::now()));
    }
    Ok(())
}
