use nimaloader::nima::{Component, ComponentKind, Result};

use crate::cmd::util::{LoadArgs, emit_json, index_label, load_actor, read_document};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub load: LoadArgs,
	#[arg(long)]
	pub json: bool,
}

/// Print the flat component list with resolved parents.
pub fn run(args: Args) -> Result<()> {
	let Args { load, json } = args;

	let bytes = read_document(&load)?;
	let actor = load_actor(&load, &bytes)?;
	let rows: Vec<ComponentJson> = actor
		.components
		.iter()
		.enumerate()
		.map(|(index, slot)| match slot {
			Some(component) => component_json(component),
			None => ComponentJson {
				index,
				kind: "empty",
				name: None,
				parent_index: None,
				parent: None,
				children: 0,
				detail: None,
			},
		})
		.collect();

	if json {
		let payload = ComponentsJson {
			path: load.path.display().to_string(),
			data_version: actor.data_version.0,
			components: rows,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", load.path.display());
	for row in &rows {
		println!(
			"{:>5} {:<20} parent={:<5} children={:<3} {}{}",
			row.index,
			row.kind,
			index_label(row.parent),
			row.children,
			row.name.as_deref().unwrap_or("-"),
			row.detail.as_deref().map(|detail| format!(" [{detail}]")).unwrap_or_default()
		);
	}

	Ok(())
}

fn component_json(component: &Component) -> ComponentJson {
	ComponentJson {
		index: component.index,
		kind: component.kind.as_str(),
		name: Some(component.name.clone()),
		parent_index: Some(component.parent_index),
		parent: component.parent,
		children: component.node().map_or(0, |node| node.children.len()),
		detail: detail(&component.kind),
	}
}

fn detail(kind: &ComponentKind) -> Option<String> {
	match kind {
		ComponentKind::Bone(bone) => Some(format!("length={} jelly_bones={}", bone.length, bone.jelly_bones.len())),
		ComponentKind::Image(image) => Some(format!(
			"visible={} vertices={} deform={}",
			image.is_visible,
			image.vertex_count(),
			image.has_vertex_deform_animation
		)),
		ComponentKind::IkTarget(target) => Some(format!("order={} bones={}", target.order, target.influenced_bones.len())),
		ComponentKind::NestedActorNode(nested) => Some(format!("asset={}", index_label(nested.asset))),
		ComponentKind::CustomProperty(value) => Some(format!("{value:?}")),
		_ => None,
	}
}

#[derive(serde::Serialize)]
struct ComponentsJson {
	path: String,
	data_version: u32,
	components: Vec<ComponentJson>,
}

#[derive(serde::Serialize)]
struct ComponentJson {
	index: usize,
	kind: &'static str,
	name: Option<String>,
	parent_index: Option<u16>,
	parent: Option<usize>,
	children: usize,
	detail: Option<String>,
}
