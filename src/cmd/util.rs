use std::path::PathBuf;

use nimaloader::nima::{Actor, ActorLoader, LoadOptions, Result};

/// Document path and load flags shared by every command.
#[derive(clap::Args)]
pub struct LoadArgs {
	pub path: PathBuf,
	#[arg(long = "nested-dir")]
	pub nested_dir: Option<PathBuf>,
	#[arg(long)]
	pub lenient: bool,
	#[arg(long = "skip-atlases")]
	pub skip_atlases: bool,
}

impl LoadArgs {
	pub(crate) fn options(&self) -> LoadOptions {
		if self.lenient { LoadOptions::lenient() } else { LoadOptions::default() }
	}

	pub(crate) fn loader(&self) -> ActorLoader {
		let mut loader = ActorLoader::new().with_options(self.options());
		if self.skip_atlases {
			loader = loader.without_image_service();
		}
		if let Some(dir) = &self.nested_dir {
			loader = loader.with_nested_dir(dir);
		}
		loader
	}
}

/// Read the document bytes named by `args`.
pub(crate) fn read_document(args: &LoadArgs) -> Result<Vec<u8>> {
	Ok(std::fs::read(&args.path)?)
}

/// Load and fully resolve the document named by `args`.
pub(crate) fn load_actor(args: &LoadArgs, bytes: &[u8]) -> Result<Actor> {
	futures::executor::block_on(args.loader().load(bytes))
}

/// Print a JSON payload to stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to encode json: {err}"),
	}
}

/// Render an optional index as text.
pub(crate) fn index_label(index: Option<usize>) -> String {
	match index {
		Some(index) => index.to_string(),
		None => "-".to_owned(),
	}
}

/// Render a four-byte signature as printable text.
pub(crate) fn render_magic(magic: [u8; 4]) -> String {
	magic
		.iter()
		.map(|byte| if byte.is_ascii_graphic() { char::from(*byte) } else { '.' })
		.collect()
}
