use std::sync::Arc;

use crate::font::{FontProvider, TextExtents};

/// Fixed-advance metrics: every char is `0.6 * size` wide, ink rises `0.75 * size` and sinks
/// `0.25 * size`. Its font database is empty, so rendered text is skipped.
pub(crate) struct MonoFont;

impl FontProvider for MonoFont {
	fn family(&self) -> &str {
		"sans-serif"
	}

	fn measure(&self, text: &str, size: u32) -> TextExtents {
		let chars = text.chars().count() as i32;
		let size = size as i32;
		TextExtents {
			left: 0,
			top: -(size * 3 / 4),
			right: (chars * size * 3 + 4) / 5,
			bottom: size / 4,
		}
	}

	fn database(&self) -> Arc<fontdb::Database> {
		Arc::new(fontdb::Database::new())
	}
}

pub(crate) fn solid_canvas(width: u32, height: u32, rgba: [u8; 4]) -> image::RgbaImage {
	image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
}
