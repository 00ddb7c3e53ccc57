use anyhow::{bail, Context, Result};
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use chipvm::display::{Frame, HEIGHT, WIDTH};

const ON: u32 = from_u8_rgb(0, 127, 255);
const OFF: u32 = from_u8_rgb(0, 0, 0);

const fn from_u8_rgb(r: u8, g: u8, b: u8) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

/// Turns framebuffer snapshots into pixels on a minifb window.
pub struct Screen {
    pixel_buffer: Vec<u32>,
    pub window: Window,
}

impl Screen {
    pub fn new(title: &str, scale: u32) -> Result<Self> {
        let scale = match scale {
            1 => Scale::X1,
            2 => Scale::X2,
            4 => Scale::X4,
            8 => Scale::X8,
            16 => Scale::X16,
            32 => Scale::X32,
            other => bail!("unsupported window scale {other}, use 1, 2, 4, 8, 16 or 32"),
        };
        let mut window = Window::new(
            title,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )
        .context("failed to open window")?;
        // the host loop sleeps until the next timer frame itself
        window.limit_update_rate(None);
        Ok(Self {
            pixel_buffer: vec![OFF; WIDTH * HEIGHT],
            window,
        })
    }

    pub fn is_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        for (dst, lit) in self.pixel_buffer.iter_mut().zip(frame.iter().flatten()) {
            *dst = if *lit { ON } else { OFF };
        }
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
            .context("failed to present frame")
    }

    /// Pumps window events without presenting a new frame.
    pub fn poll(&mut self) {
        self.window.update();
    }
}
