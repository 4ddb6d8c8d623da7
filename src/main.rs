use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{
	Result,
	eyre::{WrapErr as _, bail},
};
use speech_bubbles::{
	Anchor, BubbleStyle, Speakers, Typeface,
	batch::{self, BatchSummary},
	config::AppConfig,
	upscale,
};
use tracing::{Level, info};

#[derive(Debug, Parser)]
#[command(name = "speech_bubbles")]
#[command(about = "Overlay speech bubbles onto images")]
struct Args {
	/// Log every layout decision.
	#[arg(short, long, global = true)]
	verbose: bool,
	/// Font file used to measure and draw bubble text. Defaults to DejaVu Sans Bold.
	#[arg(long, global = true)]
	font: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Put one or two speech bubbles on a single image
	Apply {
		/// Path to input image
		input: PathBuf,
		/// Path to save output image
		output: PathBuf,
		/// Text for the left person's speech bubble
		#[arg(short, long)]
		left: Option<String>,
		/// Text for the right person's speech bubble
		#[arg(short, long)]
		right: Option<String>,
		/// Point the left tail at X,Y (fractions of the image size)
		#[arg(long, value_name = "X,Y")]
		left_pos: Option<Anchor>,
		/// Point the right tail at X,Y (fractions of the image size)
		#[arg(long, value_name = "X,Y")]
		right_pos: Option<Anchor>,
		/// Print the placed bubbles as JSON
		#[arg(long)]
		json: bool,
	},
	/// Apply bubbles to every scene listed in a config file
	Batch {
		/// Scene config. Defaults to $XDG_CONFIG_HOME/speech_bubbles.
		#[arg(short, long)]
		config: Option<PathBuf>,
	},
	/// Upscale an image locally with Lanczos resampling
	Upscale {
		image: PathBuf,
		#[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(2..=4))]
		scale: u32,
	},
}

fn main() -> Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	init_logging(args.verbose);

	match args.command {
		Command::Apply {
			input,
			output,
			left,
			right,
			left_pos,
			right_pos,
			json,
		} => {
			let speakers = Speakers {
				left,
				right,
				left_anchor: left_pos,
				right_anchor: right_pos,
			};
			speakers.requests()?;
			if !input.exists() {
				bail!("{} not found", input.display());
			}

			let font = Typeface::load(args.font.as_deref())?;
			let bubbles = batch::apply_file(&input, &output, &font, &BubbleStyle::default(), &speakers)?;
			if json {
				println!("{}", serde_json::to_string_pretty(&bubbles)?);
			}
			println!("Saved: {}", output.display());
		}
		Command::Batch { config } => {
			let config = AppConfig::read(config.as_deref())?;
			let font_path = args.font.or_else(|| config.font.clone());
			let font = Typeface::load(font_path.as_deref()).wrap_err("Failed to resolve the bubble font")?;

			info!(scenes = config.scenes.len(), output_dir = %config.output_dir.display(), "starting batch");
			let BatchSummary { written, skipped } = batch::run(&config, &font)?;
			println!("\nDone! {written} images saved to {}/ ({skipped} skipped)", config.output_dir.display());
		}
		Command::Upscale { image, scale } => {
			if !image.exists() {
				bail!("{} not found", image.display());
			}
			let output = upscale::upscale(&image, scale)?;
			let (width, height) = image::image_dimensions(&output)?;
			println!("Upscaled {scale}x -> {} ({width}x{height})", output.display());
		}
	}

	Ok(())
}

fn init_logging(verbose: bool) {
	let level = if verbose { Level::DEBUG } else { Level::INFO };
	let _ = tracing_subscriber::fmt().with_max_level(level).with_target(false).with_writer(std::io::stderr).try_init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn upscale_factor_is_limited() {
		let parse = |scale: &str| Args::try_parse_from(["speech_bubbles", "upscale", "scene.png", "--scale", scale]);
		assert!(parse("8").is_err());
		assert!(parse("4294967295").is_err());
		assert!(matches!(parse("3").unwrap().command, Command::Upscale { scale: 3, .. }));
	}

	#[test]
	fn apply_parses_anchor_pairs() {
		let args = Args::try_parse_from(["speech_bubbles", "apply", "in.png", "out.png", "--left", "migwọ", "--left-pos", "0.30,0.25"]).unwrap();
		assert!(matches!(args.command, Command::Apply { left_pos: Some(anchor), .. } if anchor == Anchor::new(0.30, 0.25)));
	}
}
