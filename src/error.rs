pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
	#[error("provide at least one of left or right text")]
	NoText,

	#[error("invalid anchor ({x}, {y}): both coordinates must be fractions in [0, 1]")]
	InvalidAnchor { x: f32, y: f32 },

	#[error("font unavailable: {0}")]
	FontUnavailable(String),

	#[error("render error: {0}")]
	Render(String),
}

impl OverlayError {
	pub fn font(msg: impl Into<String>) -> Self {
		Self::FontUnavailable(msg.into())
	}

	pub fn render(msg: impl Into<String>) -> Self {
		Self::Render(msg.into())
	}
}
