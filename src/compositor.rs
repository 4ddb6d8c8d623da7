use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::debug;

use crate::{
	error::{OverlayError, OverlayResult},
	font::FontProvider,
	overlay::PlacedBubble,
	style::{BubbleStyle, Color},
};

/// Draws `bubbles` in list order onto one transparent layer, blends it over `surface` once and
/// flattens the result to opaque RGB.
pub fn render(mut surface: RgbaImage, font: &dyn FontProvider, style: &BubbleStyle, bubbles: &[PlacedBubble]) -> OverlayResult<RgbImage> {
	let (width, height) = surface.dimensions();
	let layer = draw_layer(width, height, font, style, bubbles)?;

	for (dst, src) in surface.pixels_mut().zip(layer.data().chunks_exact(4)) {
		dst.0 = over(dst.0, [src[0], src[1], src[2], src[3]]);
	}
	Ok(DynamicImage::ImageRgba8(surface).into_rgb8())
}

/// Renders the bubble layer alone, premultiplied, the size of the surface.
pub fn draw_layer(width: u32, height: u32, font: &dyn FontProvider, style: &BubbleStyle, bubbles: &[PlacedBubble]) -> OverlayResult<tiny_skia::Pixmap> {
	let svg = layer_svg(width, height, font, style, bubbles);

	let mut options = usvg::Options::default();
	options.fontdb = font.database();
	let tree = usvg::Tree::from_str(&svg, &options).map_err(|e| OverlayError::render(format!("bubble layer: {e}")))?;

	let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| OverlayError::render(format!("failed to create {width}x{height} pixmap")))?;
	resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
	debug!(width, height, bubbles = bubbles.len(), "bubble layer rendered");
	Ok(pixmap)
}

fn layer_svg(width: u32, height: u32, font: &dyn FontProvider, style: &BubbleStyle, bubbles: &[PlacedBubble]) -> String {
	let family = escape_xml(font.family());
	let weight = font.weight();
	let body_paint = format!("{} {}", paint("fill", style.fill), paint("stroke", style.outline));
	let seam_paint = paint("stroke", style.fill);
	let text_paint = paint("fill", style.text);

	let elements: String = bubbles
		.iter()
		.map(|bubble| {
			let g = &bubble.geometry;
			let b = g.body;
			let [base_l, base_r] = g.tail_base;
			let apex = g.tail_apex;
			format!(
				r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" {body_paint} stroke-width="{}"/>
  <polygon points="{},{} {},{} {},{}" {body_paint} stroke-width="{}"/>
  <line x1="{}" y1="{y}" x2="{}" y2="{y}" {seam_paint} stroke-width="{}"/>
  <text x="{}" y="{}" font-family="'{family}'" font-weight="{weight}" font-size="{}" {text_paint} xml:space="preserve">{}</text>
"#,
				b.x0,
				b.y0,
				b.width(),
				b.height(),
				style.outline_width,
				base_l.x,
				base_l.y,
				base_r.x,
				base_r.y,
				apex.x,
				apex.y,
				style.tail_outline_width,
				apex.x - style.seam_half_width,
				apex.x + style.seam_half_width,
				style.seam_width,
				g.text_origin.x,
				g.text_origin.y,
				bubble.font_size,
				escape_xml(&bubble.text),
				r = g.corner_radius,
				y = b.y1,
			)
		})
		.collect();

	format!(
		r#"<?xml version="1.0" encoding="UTF-8"?>
<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">
{elements}</svg>"#
	)
}

fn paint(attr: &str, [r, g, b, a]: Color) -> String {
	format!(r#"{attr}="rgb({r},{g},{b})" {attr}-opacity="{:.4}""#, a as f32 / 255.0)
}

fn escape_xml(text: &str) -> String {
	text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;").replace('\'', "&apos;")
}

/// Source-over of a premultiplied `src` onto a straight-alpha `dst`, returning straight alpha.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
	if src[3] == 0 {
		return dst;
	}
	let src_a = src[3] as f32 / 255.0;
	let dst_a = dst[3] as f32 / 255.0;
	let out_a = src_a + dst_a * (1.0 - src_a);

	let mut out = [0u8; 4];
	for i in 0..3 {
		let premul = src[i] as f32 / 255.0 + (dst[i] as f32 / 255.0) * dst_a * (1.0 - src_a);
		out[i] = ((premul / out_a) * 255.0).round().clamp(0.0, 255.0) as u8;
	}
	out[3] = (out_a * 255.0).round() as u8;
	out
}
