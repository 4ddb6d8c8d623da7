use serde::Serialize;

use crate::{font::FittedFont, style::BubbleStyle};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
	pub x: i32,
	pub y: i32,
}

impl Point {
	pub fn new(x: i32, y: i32) -> Self {
		Self { x, y }
	}
}

/// Integer pixel rectangle, `x1`/`y1` exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
	pub x0: i32,
	pub y0: i32,
	pub x1: i32,
	pub y1: i32,
}

impl Rect {
	pub fn from_origin(x0: i32, y0: i32, width: i32, height: i32) -> Self {
		Self {
			x0,
			y0,
			x1: x0 + width,
			y1: y0 + height,
		}
	}

	pub fn width(&self) -> i32 {
		self.x1 - self.x0
	}

	pub fn height(&self) -> i32 {
		self.y1 - self.y0
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canvas {
	pub width: i32,
	pub height: i32,
}

impl Canvas {
	/// Dimensions past `i32::MAX` saturate.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width: i32::try_from(width).unwrap_or(i32::MAX),
			height: i32::try_from(height).unwrap_or(i32::MAX),
		}
	}
}

/// Final placement of one bubble. Built once; clamping happens before construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BubbleGeometry {
	pub body: Rect,
	pub corner_radius: i32,
	pub tail_apex: Point,
	/// Left and right corners of the tail on the body's bottom edge.
	pub tail_base: [Point; 2],
	/// Pen position for the text, chosen so the ink starts `padding` inside the body's top-left.
	pub text_origin: Point,
}

/// Places a bubble for `text` so its tail points at `anchor` (pixels).
///
/// The body is centered on the anchor and floats `tail_size` above it, then is shifted inside the
/// horizontal margins and below the top margin. The right clamp runs last, so a body wider than the
/// usable width ends at the right margin and overflows past the left one. The bottom edge is never
/// clamped.
pub fn layout_bubble(text: &str, font: &FittedFont<'_>, anchor: Point, canvas: Canvas, style: &BubbleStyle) -> BubbleGeometry {
	let extents = font.extents(text);
	let width = extents.width() + 2 * style.padding;
	let height = extents.height() + 2 * style.padding;

	let x0 = clamp_horizontal(anchor.x - width / 2, width, canvas.width, style.margin);
	let y0 = (anchor.y - height - style.tail_size).max(style.margin);
	let body = Rect::from_origin(x0, y0, width, height);

	let apex_x = if body.width() >= 2 * style.tail_inset {
		anchor.x.clamp(body.x0 + style.tail_inset, body.x1 - style.tail_inset)
	} else {
		body.x0 + body.width() / 2
	};
	let tail_apex = Point::new(apex_x, body.y1 + style.tail_size);

	BubbleGeometry {
		body,
		corner_radius: style.corner_radius,
		tail_apex,
		tail_base: [Point::new(apex_x - style.tail_half_base, body.y1), Point::new(apex_x + style.tail_half_base, body.y1)],
		text_origin: Point::new(body.x0 + style.padding - extents.left, body.y0 + style.padding - extents.top),
	}
}

fn clamp_horizontal(x0: i32, width: i32, canvas_width: i32, margin: i32) -> i32 {
	let x0 = x0.max(margin);
	let right_limit = canvas_width - margin;
	if x0 + width > right_limit { right_limit - width } else { x0 }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_util::MonoFont;

	fn place(text: &str, size: u32, anchor: (i32, i32), canvas: (u32, u32)) -> BubbleGeometry {
		let font = MonoFont;
		let fitted = FittedFont::new(size, &font);
		layout_bubble(text, &fitted, Point::new(anchor.0, anchor.1), Canvas::new(canvas.0, canvas.1), &BubbleStyle::default())
	}

	#[test]
	fn floats_centered_above_anchor() {
		let g = place("migwọ", 42, (512, 600), (1024, 1024));
		// 5 chars at 42px: 126 wide, 41 tall, plus 20px padding on each side
		assert_eq!(g.body, Rect { x0: 429, y0: 504, x1: 595, y1: 585 });
		assert_eq!(g.tail_apex, Point::new(512, 600));
		assert_eq!(g.tail_base, [Point::new(504, 585), Point::new(520, 585)]);
		assert_eq!(g.corner_radius, 18);
		assert_eq!(g.text_origin, Point::new(449, 555));
	}

	#[test]
	fn scenario_left_speaker_near_top_third() {
		let (w, h) = (1024, 1024);
		let anchor = ((0.30 * w as f64) as i32, (0.25 * h as f64) as i32);
		let g = place("migwọ", 42, anchor, (w, h));
		assert_eq!(g.body.y0, (anchor.1 - g.body.height() - 15).max(25));
		assert!(g.body.x0 >= 25 && g.body.x1 <= 999);
		assert_eq!(g.tail_apex.x, anchor.0);
	}

	#[test]
	fn shifts_right_off_left_edge() {
		let g = place("Omamọ urhiọke!", 30, (10, 500), (1024, 1024));
		assert_eq!(g.body.x0, 25);
		assert_eq!(g.tail_apex.x, g.body.x0 + 20);
	}

	#[test]
	fn shifts_left_off_right_edge() {
		let g = place("Omamọ urhiọke!", 30, (1020, 500), (1024, 1024));
		assert_eq!(g.body.x1, 999);
		assert_eq!(g.tail_apex.x, g.body.x1 - 20);
	}

	#[test]
	fn wider_than_canvas_ends_at_right_margin() {
		let g = place("a very much longer line of dialogue text here", 22, (150, 250), (300, 300));
		assert_eq!(g.body.x1, 275);
		assert!(g.body.x0 < 25);
		assert!((g.body.x0..=g.body.x1).contains(&g.tail_apex.x));
	}

	#[test]
	fn top_margin_pushes_down_but_bottom_is_free() {
		let g = place("do!", 42, (400, 10), (800, 600));
		assert_eq!(g.body.y0, 25);
		assert!(g.tail_apex.y > 10);

		let low = place("do!", 42, (400, 700), (800, 600));
		assert_eq!(low.tail_apex.y, 700);
	}

	#[test]
	fn text_origin_cancels_left_bearing() {
		struct Bearing;
		impl crate::font::FontProvider for Bearing {
			fn family(&self) -> &str {
				"sans-serif"
			}

			fn measure(&self, _text: &str, _size: u32) -> crate::font::TextExtents {
				crate::font::TextExtents { left: 3, top: -30, right: 103, bottom: 8 }
			}

			fn database(&self) -> std::sync::Arc<fontdb::Database> {
				std::sync::Arc::new(fontdb::Database::new())
			}
		}

		let font = Bearing;
		let fitted = FittedFont::new(42, &font);
		let g = layout_bubble("Obuwevwi", &fitted, Point::new(500, 500), Canvas::new(1024, 1024), &BubbleStyle::default());
		assert_eq!(g.body.width(), 140);
		// ink spans pen + 3 ..= pen + 103, so it lands exactly inside the padding
		assert_eq!(g.text_origin.x + 3, g.body.x0 + 20);
		assert_eq!(g.text_origin.x + 103, g.body.x1 - 20);
		assert_eq!(g.text_origin.y - 30, g.body.y0 + 20);
	}

	#[test]
	fn narrow_body_centers_tail() {
		let font = MonoFont;
		let style = BubbleStyle { padding: 4, ..Default::default() };
		let fitted = FittedFont::new(22, &font);
		let g = layout_bubble("i", &fitted, Point::new(700, 400), Canvas::new(1024, 1024), &style);
		assert!(g.body.width() < 40);
		assert_eq!(g.tail_apex.x, g.body.x0 + g.body.width() / 2);
	}

	#[test]
	fn oversized_canvas_dimensions_saturate() {
		assert_eq!(Canvas::new(u32::MAX, 600), Canvas { width: i32::MAX, height: 600 });
		assert_eq!(Canvas::new(1024, 1024), Canvas { width: 1024, height: 1024 });
	}

	#[test]
	fn identical_inputs_identical_geometry() {
		let a = place("Vrẹndo", 36, (870, 205), (1024, 1024));
		let b = place("Vrẹndo", 36, (870, 205), (1024, 1024));
		assert_eq!(a, b);
	}

	#[test]
	fn stays_inside_canvas_across_sizes_and_anchors() {
		let texts = ["A", "do!", "Mavọ?", "E Omamọ ganre", "Omamọ Ovwọvwọn!"];
		for (w, h) in [(100, 100), (320, 240), (800, 600), (1024, 1024), (1600, 900)] {
			let usable = w as i32 - 50;
			for text in texts {
				for size in [22, 32, 42] {
					for fx in [0.0, 0.1, 0.5, 0.9, 1.0] {
						for fy in [0.0, 0.2, 0.5, 1.0] {
							let anchor = ((fx * w as f64) as i32, (fy * h as f64) as i32);
							let g = place(text, size, anchor, (w, h));
							assert!(g.body.x1 <= w as i32 - 25, "{text} {size} {anchor:?} {w}x{h}: {:?}", g.body);
							assert!(g.body.y0 >= 25);
							if g.body.width() <= usable {
								assert!(g.body.x0 >= 25, "{text} {size} {anchor:?} {w}x{h}: {:?}", g.body);
							}
							assert!((g.body.x0..=g.body.x1).contains(&g.tail_apex.x));
							assert_eq!(g.tail_apex.y, g.body.y1 + 15);
						}
					}
				}
			}
		}
	}
}
