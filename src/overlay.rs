use std::str::FromStr;

use derive_new::new;
use image::{RgbImage, RgbaImage};
use serde::Serialize;
use tracing::debug;

use crate::{
	compositor,
	error::{OverlayError, OverlayResult},
	font::{FontProvider, select_font},
	geometry::{BubbleGeometry, Canvas, Point, layout_bubble},
	style::BubbleStyle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Left,
	Right,
}

/// Point a tail aims at, as fractions of the canvas size; `(0, 0)` is top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
	pub x: f32,
	pub y: f32,
}

impl Anchor {
	pub fn new(x: f32, y: f32) -> Self {
		Self { x, y }
	}

	pub fn validate(self) -> OverlayResult<Self> {
		let unit = 0.0..=1.0;
		match unit.contains(&self.x) && unit.contains(&self.y) {
			true => Ok(self),
			false => Err(OverlayError::InvalidAnchor { x: self.x, y: self.y }),
		}
	}

	pub fn to_pixels(self, canvas: Canvas) -> Point {
		Point::new((self.x as f64 * canvas.width as f64) as i32, (self.y as f64 * canvas.height as f64) as i32)
	}
}

impl FromStr for Anchor {
	type Err = String;

	/// Parses `"x,y"`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y fractions, got {s:?}"))?;
		let parse = |v: &str| v.trim().parse::<f32>().map_err(|e| format!("{v:?}: {e}"));
		Anchor::new(parse(x)?, parse(y)?).validate().map_err(|e| e.to_string())
	}
}

/// One bubble to place.
#[derive(Clone, Debug, PartialEq, new)]
pub struct BubbleRequest {
	pub text: String,
	pub anchor: Option<Anchor>,
	pub side: Side,
}

/// Dialogue for one image: up to one line per side, each with an optional anchor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Speakers {
	pub left: Option<String>,
	pub right: Option<String>,
	pub left_anchor: Option<Anchor>,
	pub right_anchor: Option<Anchor>,
}

impl Speakers {
	/// Present lines in draw order, left first. Blank text counts as absent.
	pub fn requests(&self) -> OverlayResult<Vec<BubbleRequest>> {
		let requests: Vec<BubbleRequest> = [(&self.left, self.left_anchor, Side::Left), (&self.right, self.right_anchor, Side::Right)]
			.into_iter()
			.filter_map(|(text, anchor, side)| text.as_ref().filter(|t| !t.trim().is_empty()).map(|t| (t, anchor, side)))
			.map(|(text, anchor, side)| -> OverlayResult<BubbleRequest> { Ok(BubbleRequest::new(text.clone(), anchor.map(Anchor::validate).transpose()?, side)) })
			.collect::<OverlayResult<_>>()?;

		if requests.is_empty() {
			return Err(OverlayError::NoText);
		}
		Ok(requests)
	}
}

/// A laid-out bubble ready for the compositor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedBubble {
	pub side: Side,
	pub text: String,
	pub font_size: u32,
	pub geometry: BubbleGeometry,
}

/// Sizes and places every bubble for a `width`x`height` canvas without drawing.
///
/// With both sides present each line is fitted to half the canvas width.
pub fn plan(font: &dyn FontProvider, style: &BubbleStyle, width: u32, height: u32, speakers: &Speakers) -> OverlayResult<Vec<PlacedBubble>> {
	let requests = speakers.requests()?;
	let canvas = Canvas::new(width, height);
	let two_sided = requests.len() == 2;
	let budget = width_budget(canvas, style, two_sided);

	let bubbles = requests
		.into_iter()
		.map(|request| {
			let anchor = match request.anchor {
				Some(anchor) => anchor.to_pixels(canvas),
				None => default_anchor(request.side, two_sided, canvas, style),
			};
			let fitted = select_font(font, &request.text, budget, style);
			let geometry = layout_bubble(&request.text, &fitted, anchor, canvas, style);
			debug!(side = ?request.side, size = fitted.size, budget, ?anchor, body = ?geometry.body, "bubble placed");
			PlacedBubble {
				side: request.side,
				text: request.text,
				font_size: fitted.size,
				geometry,
			}
		})
		.collect();
	Ok(bubbles)
}

/// Places the dialogue and composites it over `surface`.
pub fn overlay(surface: RgbaImage, font: &dyn FontProvider, style: &BubbleStyle, speakers: &Speakers) -> OverlayResult<RgbImage> {
	let bubbles = plan(font, style, surface.width(), surface.height(), speakers)?;
	compositor::render(surface, font, style, &bubbles)
}

pub fn width_budget(canvas: Canvas, style: &BubbleStyle, two_sided: bool) -> i32 {
	match two_sided {
		true => canvas.width / 2 - 2 * style.margin,
		false => canvas.width - 2 * style.margin,
	}
}

fn default_anchor(side: Side, two_sided: bool, canvas: Canvas, style: &BubbleStyle) -> Point {
	let x = match (side, two_sided) {
		(Side::Left, true) => canvas.width / 4,
		(Side::Right, true) => 3 * canvas.width / 4,
		(Side::Left, false) => canvas.width / 3,
		(Side::Right, false) => 2 * canvas.width / 3,
	};
	Point::new(x, canvas.height - style.default_anchor_lift())
}
