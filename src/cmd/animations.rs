use nimaloader::nima::{Actor, AnimatedComponent, Animation, Result};

use crate::cmd::util::{LoadArgs, emit_json, load_actor, read_document};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub load: LoadArgs,
	/// Only show the animation with this name.
	#[arg(long)]
	pub name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// Print animation headers and per-track keyframe counts.
pub fn run(args: Args) -> Result<()> {
	let Args { load, name, json } = args;

	let bytes = read_document(&load)?;
	let actor = load_actor(&load, &bytes)?;
	let animations: Vec<AnimationJson> = actor
		.animations
		.iter()
		.filter(|animation| name.as_deref().is_none_or(|wanted| animation.name == wanted))
		.map(|animation| animation_json(&actor, animation))
		.collect();

	if json {
		let payload = AnimationsJson {
			path: load.path.display().to_string(),
			data_version: actor.data_version.0,
			animations,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", load.path.display());
	for animation in &animations {
		println!(
			"animation {:?}: fps={} duration={} loop={} display={}..{}",
			animation.name, animation.fps, animation.duration, animation.looping, animation.display_start, animation.display_end
		);
		for track in &animation.tracks {
			let marker = if track.trigger { " (trigger)" } else { "" };
			println!("  component {} {}{}", track.component_index, track.component_name.as_deref().unwrap_or("-"), marker);
			for property in &track.properties {
				println!("    {:<18} keyframes={:<4} interpolations={}", property.property, property.keyframes, property.interpolations.join(","));
			}
		}
	}

	Ok(())
}

fn animation_json(actor: &Actor, animation: &Animation) -> AnimationJson {
	let regular = animation.components.iter().map(|track| track_json(actor, track, false));
	let triggers = animation.trigger_components.iter().map(|track| track_json(actor, track, true));
	AnimationJson {
		name: animation.name.clone(),
		fps: animation.fps,
		duration: animation.duration,
		looping: animation.looping,
		display_start: animation.display_start,
		display_end: animation.display_end,
		keyframes: animation.keyframe_count(),
		tracks: regular.chain(triggers).collect(),
	}
}

fn track_json(actor: &Actor, track: &AnimatedComponent, trigger: bool) -> TrackJson {
	TrackJson {
		component_index: track.component_index,
		component_name: actor.component(usize::from(track.component_index)).map(|component| component.name.clone()),
		trigger,
		properties: track
			.properties
			.iter()
			.map(|property| {
				let mut interpolations: Vec<&'static str> = property.keyframes.iter().map(|frame| frame.interpolation.as_str()).collect();
				interpolations.dedup();
				PropertyJson {
					property: property.property_type.as_str(),
					keyframes: property.keyframes.len(),
					time_ordered: property.is_time_ordered(),
					interpolations,
				}
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct AnimationsJson {
	path: String,
	data_version: u32,
	animations: Vec<AnimationJson>,
}

#[derive(serde::Serialize)]
struct AnimationJson {
	name: String,
	fps: u8,
	duration: f32,
	looping: bool,
	display_start: f32,
	display_end: f32,
	keyframes: usize,
	tracks: Vec<TrackJson>,
}

#[derive(serde::Serialize)]
struct TrackJson {
	component_index: u16,
	component_name: Option<String>,
	trigger: bool,
	properties: Vec<PropertyJson>,
}

#[derive(serde::Serialize)]
struct PropertyJson {
	property: &'static str,
	keyframes: usize,
	time_ordered: bool,
	interpolations: Vec<&'static str>,
}
