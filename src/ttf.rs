use rusttype::{point, Font, PositionedGlyph, Scale};
use std::fs;
use std::path::Path;

pub struct FontRenderer {
    font: Font<'static>,
}

impl FontRenderer {
    /// Naive search of common macOS/Linux font paths for the configured
    /// family; the HUD falls back to the bitmap font when nothing loads.
    pub fn try_load(family: &str) -> Option<Self> {
        let paths = [
            format!("/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/Supplemental/{}.ttf", family),
            format!("/usr/share/fonts/truetype/{}.ttf", family),
            format!("{}.ttf", family),
        ];

        for p in paths.iter() {
            if Path::new(p).exists() {
                if let Ok(data) = fs::read(p) {
                    if let Some(font) = Font::try_from_vec(data) {
                        println!("Loaded font from {}", p);
                        return Some(Self { font });
                    }
                }
            }
        }

        println!(
            "Could not find font family '{}'. Falling back to bitmap.",
            family
        );
        None
    }

    pub fn draw_text(
        &self,
        buffer: &mut [u8],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
        text: &str,
        color: (u8, u8, u8),
        size_pt: f32,
    ) {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = self
            .font
            .layout(text, scale, point(x as f32, y as f32 + v_metrics.ascent))
            .collect();

        for glyph in glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    if v < 0.3 {
                        return;
                    }
                    let px = bb.min.x + gx as i32;
                    let py = bb.min.y + gy as i32;
                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        return;
                    }
                    let idx = (py as usize * width + px as usize) * 3;
                    if idx + 2 < buffer.len() {
                        buffer[idx] = color.0;
                        buffer[idx + 1] = color.1;
                        buffer[idx + 2] = color.2;
                    }
                });
            }
        }
    }

    pub fn measure_height(&self, size_pt: f32) -> usize {
        let v_metrics = self.font.v_metrics(Scale::uniform(size_pt));
        (v_metrics.ascent - v_metrics.descent).ceil() as usize
    }
}
