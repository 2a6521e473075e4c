use nimaloader::nima::{AnimationHeader, NimaHeader, PropertyFraming, Result};

use crate::cmd::util::{LoadArgs, emit_json, load_actor, read_document, render_magic};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub load: LoadArgs,
	#[arg(long)]
	pub json: bool,
}

/// Print header fields, section counts, and the recorded diagnostic.
pub fn run(args: Args) -> Result<()> {
	let Args { load, json } = args;

	let bytes = read_document(&load)?;
	let header = NimaHeader::parse(&bytes, load.options().signature)?;
	let layout = header.version.layout();
	let actor = load_actor(&load, &bytes)?;

	let present = actor.iter_components().count();
	let payload = InfoJson {
		path: load.path.display().to_string(),
		signature: render_magic(header.magic),
		signature_ok: header.signature_ok(),
		raw_version: header.raw_version,
		data_version: header.version.0,
		named_animations: layout.animation_header == AnimationHeader::Named,
		property_blocks: layout.property_framing == PropertyFraming::Block,
		component_slots: actor.components.len(),
		components: present,
		empty_slots: actor.components.len() - present,
		animations: actor.animations.len(),
		keyframes: actor.animations.iter().map(|animation| animation.keyframe_count()).sum(),
		atlases: actor.atlases.len(),
		atlases_resolved: actor.atlases.iter().filter(|atlas| atlas.image.is_some()).count(),
		nested_assets: actor.nested_assets.len(),
		nested_resolved: actor.nested_assets.iter().filter(|asset| asset.actor.is_some()).count(),
		view: actor.view.map(|view| ViewJson {
			center: [view.center.x, view.center.y],
			width: view.width,
			height: view.height,
		}),
		error: actor.error.as_ref().map(ToString::to_string),
	};

	if json {
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", payload.path);
	println!("signature: {} (ok={})", payload.signature, payload.signature_ok);
	println!("raw_version: {}", payload.raw_version);
	println!("data_version: {}", payload.data_version);
	println!("named_animations: {}", payload.named_animations);
	println!("property_blocks: {}", payload.property_blocks);
	println!("components: {} ({} empty slots)", payload.components, payload.empty_slots);
	println!("animations: {} ({} keyframes)", payload.animations, payload.keyframes);
	println!("atlases: {} ({} resolved)", payload.atlases, payload.atlases_resolved);
	println!("nested_assets: {} ({} resolved)", payload.nested_assets, payload.nested_resolved);
	match &payload.view {
		Some(view) => println!("view: center=({}, {}) size={}x{}", view.center[0], view.center[1], view.width, view.height),
		None => println!("view: -"),
	}
	println!("error: {}", payload.error.as_deref().unwrap_or("-"));

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	signature: String,
	signature_ok: bool,
	raw_version: u32,
	data_version: u32,
	named_animations: bool,
	property_blocks: bool,
	component_slots: usize,
	components: usize,
	empty_slots: usize,
	animations: usize,
	keyframes: usize,
	atlases: usize,
	atlases_resolved: usize,
	nested_assets: usize,
	nested_resolved: usize,
	view: Option<ViewJson>,
	error: Option<String>,
}

#[derive(serde::Serialize)]
struct ViewJson {
	center: [f64; 2],
	width: f32,
	height: f32,
}
