use cathode_core::core::memory::MemoryImage;
use cathode_machines::vic20::{CHAR_ROM_BASE, SCREEN_BASE, SCREEN_COLS, SCREEN_ROWS};
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

/// Native display size: the character matrix at 8×8 pixels per cell.
const DISPLAY_WIDTH: u32 = SCREEN_COLS as u32 * 8;
const DISPLAY_HEIGHT: u32 = SCREEN_ROWS as u32 * 8;

/// The character-matrix display: window, renderer, and the RGB24
/// framebuffer the matrix is rasterized into. The geometry is fixed by
/// the machine; only the window scale is configurable.
pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    framebuffer: Vec<u8>,
}

impl Video {
    /// Create the SDL window and renderer at the given scale factor.
    pub fn new(sdl_video: &sdl2::VideoSubsystem, title: &str, scale: u32) -> Self {
        let window = sdl_video
            .window(title, DISPLAY_WIDTH * scale, DISPLAY_HEIGHT * scale)
            .position_centered()
            .build()
            .expect("Failed to create window");

        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .expect("Failed to create canvas");

        let texture_creator = canvas.texture_creator();

        Self {
            canvas,
            texture_creator,
            framebuffer: vec![0; (DISPLAY_WIDTH * DISPLAY_HEIGHT * 3) as usize],
        }
    }

    /// Rasterize the character matrix from the memory image and present
    /// one frame.
    ///
    /// Pull-only: the memory image is treated as eventually consistent,
    /// which is fine at frame rate.
    pub fn render(&mut self, mem: &MemoryImage) {
        rasterize(mem, &mut self.framebuffer);

        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, DISPLAY_WIDTH, DISPLAY_HEIGHT)
            .expect("Failed to create texture");

        texture
            .update(None, &self.framebuffer, (DISPLAY_WIDTH * 3) as usize)
            .expect("Failed to update texture");

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .expect("Failed to copy texture");
        self.canvas.present();
    }
}

/// Sample the screen window of the memory image, look up each code's
/// 8×8 glyph in the character-ROM region, and draw black-on-white.
fn rasterize(mem: &MemoryImage, buffer: &mut [u8]) {
    for row in 0..SCREEN_ROWS {
        for col in 0..SCREEN_COLS {
            let code = mem.read(SCREEN_BASE + row * SCREEN_COLS + col);
            for line in 0..8u16 {
                let glyph = mem.read(CHAR_ROM_BASE + code as u16 * 8 + line);
                let y = row as u32 * 8 + line as u32;
                for x in 0..8u32 {
                    let on = glyph & (0x80 >> x) != 0;
                    let shade = if on { 0x00 } else { 0xFF };
                    let offset = ((y * DISPLAY_WIDTH + col as u32 * 8 + x) * 3) as usize;
                    buffer[offset] = shade;
                    buffer[offset + 1] = shade;
                    buffer[offset + 2] = shade;
                }
            }
        }
    }
}
