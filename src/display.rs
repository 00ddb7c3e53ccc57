pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Row-major pixel grid, `true` = lit.
pub type Frame = [[bool; WIDTH]; HEIGHT];

#[derive(Debug, Clone)]
pub struct FrameBuffer {
    bit_buffer: Frame,
    dirty: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: [[false; WIDTH]; HEIGHT],
            dirty: false,
        }
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer = [[false; WIDTH]; HEIGHT];
        self.dirty = true;
    }

    /// XORs an 8-pixel wide sprite onto the grid with its top-left corner at
    /// `(x, y)`. Every pixel wraps around the edges independently. Returns
    /// `true` when a lit pixel was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut vf = false;
        for (i, row) in sprite.iter().enumerate() {
            let ny = (y as usize + i) % HEIGHT;
            for j in 0..8 {
                if (row >> (7 - j)) & 1 == 0 {
                    continue;
                }
                let nx = (x as usize + j) % WIDTH;
                let pixel = &mut self.bit_buffer[ny][nx];
                if *pixel {
                    vf = true;
                }
                *pixel = !*pixel;
            }
        }
        self.dirty = true;
        vf
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.bit_buffer[y % HEIGHT][x % WIDTH]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Snapshot for the renderer. The flag says whether anything changed since
    /// the previous call and is cleared by this read.
    pub fn take_frame(&mut self) -> (Frame, bool) {
        let changed = std::mem::replace(&mut self.dirty, false);
        (self.bit_buffer, changed)
    }
}
