use std::{
	fmt,
	path::{Path, PathBuf},
	sync::Arc,
};

use tracing::debug;
use ttf_parser::Face;

use crate::{
	error::{OverlayError, OverlayResult},
	style::BubbleStyle,
};

pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

const FALLBACK_FAMILY: &str = "DejaVu Sans";

/// Ink bounds of a single line of text, in pixels.
///
/// The origin is the pen start on the baseline and y grows downwards, so `top` is negative for
/// glyphs that rise above the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextExtents {
	pub left: i32,
	pub top: i32,
	pub right: i32,
	pub bottom: i32,
}

impl TextExtents {
	pub fn width(&self) -> i32 {
		self.right - self.left
	}

	pub fn height(&self) -> i32 {
		self.bottom - self.top
	}
}

/// The one typeface used for both measuring and drawing bubble text.
pub trait FontProvider {
	/// Family name the renderer resolves against [`FontProvider::database`].
	fn family(&self) -> &str;

	fn weight(&self) -> u16 {
		400
	}

	fn measure(&self, text: &str, size: u32) -> TextExtents;

	/// Font database holding this face, handed to the SVG renderer.
	fn database(&self) -> Arc<fontdb::Database>;
}

/// A font face loaded once at startup and shared by sizing, layout and drawing.
pub struct Typeface {
	db: Arc<fontdb::Database>,
	id: fontdb::ID,
	family: String,
	weight: u16,
}

impl Typeface {
	/// Loads `path`, or [`DEFAULT_FONT_PATH`] when `None`. A missing default falls back to a bold
	/// DejaVu Sans (then any bold sans-serif) from the system font database.
	pub fn load(path: Option<&Path>) -> OverlayResult<Self> {
		match path {
			Some(path) => Self::from_file(path),
			None => {
				let default = PathBuf::from(DEFAULT_FONT_PATH);
				if default.exists() {
					Self::from_file(&default)
				} else {
					debug!(path = DEFAULT_FONT_PATH, "default font missing, querying system fonts");
					Self::from_system()
				}
			}
		}
	}

	pub fn from_file(path: &Path) -> OverlayResult<Self> {
		let data = std::fs::read(path).map_err(|e| OverlayError::font(format!("failed to read {}: {e}", path.display())))?;
		Self::from_data(data, 0).map_err(|e| OverlayError::font(format!("{}: {e}", path.display())))
	}

	pub fn from_system() -> OverlayResult<Self> {
		let mut system = fontdb::Database::new();
		system.load_system_fonts();

		let candidates = [[fontdb::Family::Name(FALLBACK_FAMILY)], [fontdb::Family::SansSerif]];
		let id = candidates
			.iter()
			.find_map(|families| {
				system.query(&fontdb::Query {
					families: families.as_slice(),
					weight: fontdb::Weight::BOLD,
					..Default::default()
				})
			})
			.ok_or_else(|| OverlayError::font("no usable sans-serif face among system fonts"))?;

		let (data, index) = system
			.with_face_data(id, |data, index| (data.to_vec(), index))
			.ok_or_else(|| OverlayError::font("failed to read system font data"))?;
		Self::from_data(data, index)
	}

	/// Builds a provider from raw font bytes, keeping face `index` of a collection.
	pub fn from_data(data: Vec<u8>, index: u32) -> OverlayResult<Self> {
		Face::parse(&data, index).map_err(|e| OverlayError::font(format!("unparsable font data: {e}")))?;

		let mut db = fontdb::Database::new();
		db.load_font_data(data);
		let face = db.faces().find(|face| face.index == index).ok_or_else(|| OverlayError::font("font data holds no usable face"))?;
		let family = face.families.first().map(|(name, _)| name.clone()).ok_or_else(|| OverlayError::font("font face has no family name"))?;
		let (id, weight) = (face.id, face.weight.0);

		debug!(family, weight, "typeface loaded");
		Ok(Self {
			db: Arc::new(db),
			id,
			family,
			weight,
		})
	}
}

impl FontProvider for Typeface {
	fn family(&self) -> &str {
		&self.family
	}

	fn weight(&self) -> u16 {
		self.weight
	}

	fn measure(&self, text: &str, size: u32) -> TextExtents {
		self.db
			.with_face_data(self.id, |data, index| rustybuzz::Face::from_slice(data, index).map(|face| measure_face(&face, text, size as f32)))
			.flatten()
			.unwrap_or_default()
	}

	fn database(&self) -> Arc<fontdb::Database> {
		Arc::clone(&self.db)
	}
}

impl fmt::Debug for Typeface {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Typeface").field("family", &self.family).field("weight", &self.weight).finish()
	}
}

/// Ink bounds of `text` after shaping, so pair kerning and mark placement match what usvg draws.
fn measure_face(face: &rustybuzz::Face<'_>, text: &str, size: f32) -> TextExtents {
	let scale = size / face.units_per_em().max(1) as f32;

	let mut buffer = rustybuzz::UnicodeBuffer::new();
	buffer.push_str(text);
	let shaped = rustybuzz::shape(face, &[], buffer);

	// (x_min, y_min, x_max, y_max) in font units, y up
	let mut ink: Option<(f32, f32, f32, f32)> = None;
	let mut pen = 0.0f32;
	for (info, pos) in shaped.glyph_infos().iter().zip(shaped.glyph_positions()) {
		let glyph = rustybuzz::ttf_parser::GlyphId(info.glyph_id as u16);
		if let Some(rect) = face.glyph_bounding_box(glyph) {
			let (dx, dy) = (pen + pos.x_offset as f32, pos.y_offset as f32);
			let glyph_ink = (dx + rect.x_min as f32, dy + rect.y_min as f32, dx + rect.x_max as f32, dy + rect.y_max as f32);
			ink = Some(match ink {
				None => glyph_ink,
				Some((x0, y0, x1, y1)) => (x0.min(glyph_ink.0), y0.min(glyph_ink.1), x1.max(glyph_ink.2), y1.max(glyph_ink.3)),
			});
		}
		pen += pos.x_advance as f32;
	}

	match ink {
		Some((x0, y0, x1, y1)) => TextExtents {
			left: (x0 * scale).floor() as i32,
			top: (-y1 * scale).floor() as i32,
			right: (x1 * scale).ceil() as i32,
			bottom: (-y0 * scale).ceil() as i32,
		},
		None => TextExtents {
			left: 0,
			top: (-(face.ascender() as f32) * scale).floor() as i32,
			right: (pen * scale).ceil() as i32,
			bottom: (-(face.descender() as f32) * scale).ceil() as i32,
		},
	}
}

/// A font size chosen for one bubble, bound to the provider that measures it.
#[derive(Clone, Copy)]
pub struct FittedFont<'f> {
	pub size: u32,
	font: &'f dyn FontProvider,
}

impl<'f> FittedFont<'f> {
	pub fn new(size: u32, font: &'f dyn FontProvider) -> Self {
		Self { size, font }
	}

	pub fn provider(&self) -> &'f dyn FontProvider {
		self.font
	}

	pub fn extents(&self, text: &str) -> TextExtents {
		self.font.measure(text, self.size)
	}

	pub fn measured_width(&self, text: &str) -> i32 {
		self.extents(text).width()
	}

	pub fn measured_height(&self, text: &str) -> i32 {
		self.extents(text).height()
	}
}

impl fmt::Debug for FittedFont<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FittedFont").field("size", &self.size).field("family", &self.font.family()).finish()
	}
}

/// Picks the largest candidate size, stepping down from `style.max_font_size`, whose padded text
/// width fits in `max_width`.
///
/// Never fails: when nothing fits, the minimum size is returned and the bubble overflows its budget.
pub fn select_font<'f>(font: &'f dyn FontProvider, text: &str, max_width: i32, style: &BubbleStyle) -> FittedFont<'f> {
	let min_size = style.min_font_size.max(1);
	let max_size = style.max_font_size.max(min_size);
	let step = style.font_step.max(1) as usize;

	(min_size..=max_size)
		.rev()
		.step_by(step)
		.map(|size| FittedFont::new(size, font))
		.find(|fitted| fitted.measured_width(text) + 2 * style.padding <= max_width)
		.unwrap_or_else(|| FittedFont::new(min_size, font))
}
