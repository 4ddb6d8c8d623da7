use std::path::Path;

use color_eyre::eyre::{Result, WrapErr as _};
use tracing::{info, warn};

use crate::{
	compositor,
	config::AppConfig,
	font::FontProvider,
	overlay::{PlacedBubble, Speakers, plan},
	style::BubbleStyle,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
	pub written: usize,
	pub skipped: usize,
}

/// Decodes `input`, draws the dialogue and writes the flattened result to `output`.
pub fn apply_file(input: &Path, output: &Path, font: &dyn FontProvider, style: &BubbleStyle, speakers: &Speakers) -> Result<Vec<PlacedBubble>> {
	speakers.requests()?;

	let surface = image::open(input).wrap_err_with(|| format!("Failed to decode {}", input.display()))?.to_rgba8();
	let bubbles = plan(font, style, surface.width(), surface.height(), speakers)?;
	let flattened = compositor::render(surface, font, style, &bubbles)?;
	flattened.save(output).wrap_err_with(|| format!("Failed to write {}", output.display()))?;
	Ok(bubbles)
}

/// Runs every scene in order. Scenes whose input is missing are skipped; any other failure stops the run.
pub fn run(config: &AppConfig, font: &dyn FontProvider) -> Result<BatchSummary> {
	std::fs::create_dir_all(&config.output_dir).wrap_err_with(|| format!("Failed to create {}", config.output_dir.display()))?;

	let mut summary = BatchSummary::default();
	for scene in &config.scenes {
		let input = config.input_path(scene);
		if !input.exists() {
			warn!(input = %input.display(), "SKIP (not found)");
			summary.skipped += 1;
			continue;
		}

		let output = config.output_path(scene);
		apply_file(&input, &output, font, &config.style, &scene.speakers()).wrap_err_with(|| format!("Scene {} failed", scene.output.display()))?;
		info!(output = %output.display(), "OK");
		summary.written += 1;
	}
	Ok(summary)
}
