use std::{
	ops::RangeInclusive,
	path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, WrapErr as _, bail};
use image::{GenericImageView, imageops::FilterType};

/// Supported enlargement factors.
pub const SCALES: RangeInclusive<u32> = 2..=4;

/// `<dir>/<stem>_upscaled_<scale>x.png`
pub fn upscaled_path(input: &Path, scale: u32) -> PathBuf {
	let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
	input.with_file_name(format!("{stem}_upscaled_{scale}x.png"))
}

/// Enlarges `input` by an integer factor with Lanczos resampling and writes it next to the source.
pub fn upscale(input: &Path, scale: u32) -> Result<PathBuf> {
	if !SCALES.contains(&scale) {
		bail!("Scale must be between {} and {}, got {scale}", SCALES.start(), SCALES.end());
	}
	let img = image::open(input).wrap_err_with(|| format!("Failed to decode {}", input.display()))?;
	let (width, height) = img.dimensions();
	let (Some(target_width), Some(target_height)) = (width.checked_mul(scale), height.checked_mul(scale)) else {
		bail!("{width}x{height} scaled {scale}x does not fit in u32 pixel dimensions");
	};
	let upscaled = img.resize_exact(target_width, target_height, FilterType::Lanczos3);

	let output = upscaled_path(input, scale);
	upscaled.save(&output).wrap_err_with(|| format!("Failed to write {}", output.display()))?;
	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_util::solid_canvas;

	#[test]
	fn names_output_after_stem_and_factor() {
		assert_eq!(upscaled_path(Path::new("output/scene.jpg"), 2), PathBuf::from("output/scene_upscaled_2x.png"));
	}

	#[test]
	fn multiplies_dimensions() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("small.png");
		solid_canvas(4, 3, [200, 10, 10, 255]).save(&input).unwrap();

		let output = upscale(&input, 3).unwrap();
		assert_eq!(output, dir.path().join("small_upscaled_3x.png"));
		assert_eq!(image::open(&output).unwrap().dimensions(), (12, 9));
	}

	#[test]
	fn rejects_factors_outside_supported_range() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("small.png");
		solid_canvas(4, 3, [200, 10, 10, 255]).save(&input).unwrap();

		for scale in [0, 1, 5, u32::MAX / 2] {
			assert!(upscale(&input, scale).is_err(), "scale {scale}");
		}
		assert!(!dir.path().join(format!("small_upscaled_{}x.png", u32::MAX / 2)).exists());
	}
}
