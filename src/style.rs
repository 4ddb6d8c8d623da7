use serde::Deserialize;

/// Straight-alpha RGBA color.
pub type Color = [u8; 4];

/// Tuning constants for bubble sizing, placement and paint.
///
/// Values are absolute pixels, tuned for canvases around 1024px.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BubbleStyle {
	/// Inner spacing between the text ink and the bubble edge.
	pub padding: i32,
	pub corner_radius: i32,
	/// Height of the tail below the bubble body.
	pub tail_size: i32,
	/// Keep-out distance from the canvas edges.
	pub margin: i32,
	/// Half the width of the tail where it meets the body.
	pub tail_half_base: i32,
	/// Minimum horizontal distance between the tail apex and the body corners.
	pub tail_inset: i32,
	pub max_font_size: u32,
	pub min_font_size: u32,
	pub font_step: u32,
	pub fill: Color,
	pub outline: Color,
	pub text: Color,
	pub outline_width: f32,
	pub tail_outline_width: f32,
	pub seam_width: f32,
	/// Half length of the stroke that hides the outline where the tail joins the body.
	pub seam_half_width: i32,
}

impl Default for BubbleStyle {
	fn default() -> Self {
		Self {
			padding: 20,
			corner_radius: 18,
			tail_size: 15,
			margin: 25,
			tail_half_base: 8,
			tail_inset: 20,
			max_font_size: 42,
			min_font_size: 22,
			font_step: 2,
			fill: [255, 255, 255, 230],
			outline: [60, 60, 60, 255],
			text: [30, 30, 30, 255],
			outline_width: 2.0,
			tail_outline_width: 1.0,
			seam_width: 3.0,
			seam_half_width: 7,
		}
	}
}

impl BubbleStyle {
	/// Vertical offset of a default anchor from the bottom canvas edge.
	pub fn default_anchor_lift(&self) -> i32 {
		self.margin + 20
	}
}
