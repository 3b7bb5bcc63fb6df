//! Coloured ASCII rendering of a decoded image

use image::imageops::FilterType;
use image::DynamicImage;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Glyphs from darkest to brightest
const RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// A terminal cell is roughly twice as tall as it is wide
const CELL_ASPECT: f64 = 2.0;

/// Calculates the new dimensions for an image to fit within a container
/// while maintaining the original aspect ratio.
///
/// Returns `(0, 0)` if any dimension is zero.
pub fn fit_image(image_width: u32, image_height: u32, container_width: u32, container_height: u32) -> (u32, u32) {
    if image_width == 0 || image_height == 0 || container_width == 0 || container_height == 0 {
        return (0, 0);
    }

    let scale_x = container_width as f64 / image_width as f64;
    let scale_y = container_height as f64 / image_height as f64;
    let scale = scale_x.min(scale_y);

    let width = (image_width as f64 * scale).round() as u32;
    let height = (image_height as f64 * scale).round() as u32;

    (width.min(container_width), height.min(container_height))
}

/// Size in terminal cells for an image shown inside `area`
pub fn cell_size(image_width: u32, image_height: u32, area_width: u16, area_height: u16) -> (u16, u16) {
    let rows = (image_height as f64 / CELL_ASPECT).round().max(1.0) as u32;
    let (w, h) = fit_image(image_width, rows, area_width as u32, area_height as u32);
    (w as u16, h as u16)
}

/// Maps a colour to a glyph by its perceived luminance
fn glyph(r: u8, g: u8, b: u8) -> char {
    let luma = 0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64;
    let index = ((luma / 255.0) * (RAMP.len() - 1) as f64).round() as usize;
    RAMP[index.min(RAMP.len() - 1)]
}

/// Draws an image as ASCII art centred in its area
pub struct AsciiImage<'a> {
    image: &'a DynamicImage,
}

impl<'a> AsciiImage<'a> {
    pub fn new(image: &'a DynamicImage) -> Self {
        Self { image }
    }
}

impl Widget for AsciiImage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (cols, rows) = cell_size(self.image.width(), self.image.height(), area.width, area.height);
        if cols == 0 || rows == 0 {
            return;
        }

        let pixels = self
            .image
            .resize_exact(cols as u32, rows as u32, FilterType::Triangle)
            .to_rgb8();
        let left = area.x + (area.width - cols) / 2;
        let top = area.y + (area.height - rows) / 2;

        for (x, y, pixel) in pixels.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            if let Some(cell) = buf.cell_mut((left + x as u16, top + y as u16)) {
                cell.set_char(glyph(r, g, b))
                    .set_style(Style::default().fg(Color::Rgb(r, g, b)));
            }
        }
    }
}
