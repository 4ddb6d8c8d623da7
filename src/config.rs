use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr as _, eyre};
use serde::{Deserialize, Deserializer};

use crate::{
	overlay::{Anchor, Speakers},
	style::BubbleStyle,
};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
	/// Directory scene inputs are resolved against.
	#[serde(default = "default_input_dir")]
	pub input_dir: PathBuf,
	#[serde(default = "default_output_dir")]
	pub output_dir: PathBuf,
	pub font: Option<PathBuf>,
	#[serde(default)]
	pub style: BubbleStyle,
	#[serde(default)]
	pub scenes: Vec<Scene>,
}

/// One image and the dialogue to put on it.
#[derive(Clone, Debug, Deserialize)]
pub struct Scene {
	pub input: PathBuf,
	pub output: PathBuf,
	pub left: Option<String>,
	pub right: Option<String>,
	pub pos_left: Option<Anchor>,
	pub pos_right: Option<Anchor>,
}

impl Scene {
	pub fn speakers(&self) -> Speakers {
		Speakers {
			left: self.left.clone(),
			right: self.right.clone(),
			left_anchor: self.pos_left,
			right_anchor: self.pos_right,
		}
	}
}

impl<'de> Deserialize<'de> for Anchor {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>, {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum AnchorHelper {
			Pair(f32, f32),
			Structured { x: f32, y: f32 },
		}

		let helper = AnchorHelper::deserialize(deserializer)?;
		Ok(match helper {
			AnchorHelper::Pair(x, y) => Anchor::new(x, y),
			AnchorHelper::Structured { x, y } => Anchor::new(x, y),
		})
	}
}

fn default_input_dir() -> PathBuf {
	PathBuf::from("output")
}

fn default_output_dir() -> PathBuf {
	PathBuf::from("output/final")
}

impl AppConfig {
	/// Reads `path` when given, otherwise `$XDG_CONFIG_HOME/speech_bubbles[/config]`. `SPEECH_BUBBLES_*`
	/// environment variables are layered underneath the file.
	pub fn read(path: Option<&Path>) -> Result<Self> {
		let app_name = env!("CARGO_PKG_NAME");
		let builder = config::Config::builder().add_source(config::Environment::with_prefix("SPEECH_BUBBLES"));

		match path {
			Some(path) => {
				let builder = builder.add_source(config::File::with_name(&path.to_string_lossy()).required(true));
				builder.build()?.try_deserialize().wrap_err_with(|| format!("Invalid scene config at {}", path.display()))
			}
			None => {
				let xdg_dirs = xdg::BaseDirectories::with_prefix(app_name);
				let xdg_conf_dir = xdg_dirs.get_config_home().ok_or_else(|| eyre!("Could not determine the config home"))?;
				let locations = [xdg_conf_dir.clone(), xdg_conf_dir.join("config")];

				let builder = locations
					.iter()
					.fold(builder, |builder, location| builder.add_source(config::File::with_name(&location.to_string_lossy()).required(false)));
				let raw: config::Config = builder.build()?;

				raw.try_deserialize().wrap_err("Config file does not exist or is invalid")
			}
		}
	}

	pub fn input_path(&self, scene: &Scene) -> PathBuf {
		self.input_dir.join(&scene.input)
	}

	pub fn output_path(&self, scene: &Scene) -> PathBuf {
		self.output_dir.join(&scene.output)
	}
}
