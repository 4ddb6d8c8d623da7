pub mod batch;
pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod geometry;
pub mod overlay;
pub mod style;
pub mod upscale;

#[cfg(test)]
mod test_util;

pub use error::{OverlayError, OverlayResult};
pub use font::{FittedFont, FontProvider, TextExtents, Typeface, select_font};
pub use geometry::{BubbleGeometry, Canvas, Point, Rect, layout_bubble};
pub use overlay::{Anchor, BubbleRequest, PlacedBubble, Side, Speakers, overlay, plan};
pub use style::BubbleStyle;
