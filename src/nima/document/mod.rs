use kurbo::Vec2;

use crate::nima::animation_reader::read_animations_block;
use crate::nima::bytes::Cursor;
use crate::nima::component_reader::read_components_block;
use crate::nima::{Actor, Atlas, BlockIter, BlockTag, ComponentKind, LoadOptions, NestedActorAsset, NimaHeader, Result, ViewBounds};

/// Decode every synchronous section of a document.
///
/// Header failures are returned as `Err`. Failures inside the block stream are recorded in
/// [`Actor::error`] and end only the section they occur in. Atlases and nested assets are read
/// but left unresolved.
#[tracing::instrument(skip_all, fields(len = bytes.len()))]
pub fn decode_document(bytes: &[u8], options: &LoadOptions) -> Result<Actor> {
	let header = NimaHeader::parse(bytes, options.signature)?;
	let layout = header.version.layout();
	tracing::debug!(raw_version = header.raw_version, version = header.version.0, "parsed header");

	let mut actor = Actor::new(header.version);
	let mut cursor = Cursor::new(bytes);
	cursor.read_exact(NimaHeader::SIZE)?;

	let mut blocks = BlockIter::new(cursor);
	for block in blocks.by_ref() {
		match block.kind() {
			Some(BlockTag::Components) => read_components_block(&mut actor, block.cursor(), &layout),
			Some(BlockTag::View) => match read_view(&mut block.cursor()) {
				Ok(view) => actor.view = Some(view),
				Err(err) => actor.record_error(err),
			},
			Some(BlockTag::Animations) => read_animations_block(&mut actor, block.cursor(), &layout),
			Some(BlockTag::Atlases) => {
				if let Err(err) = read_atlases(&mut block.cursor(), &mut actor.atlases) {
					actor.record_error(err);
				}
			}
			Some(BlockTag::NestedActorAssets) => read_nested_assets(&mut actor, block.cursor()),
			_ => tracing::debug!(tag = block.tag, offset = block.offset, len = block.payload.len(), "skipping top-level block"),
		}
	}
	if let Some(err) = blocks.take_error() {
		actor.record_error(err);
	}

	attach_nested_nodes(&mut actor);
	Ok(actor)
}

fn read_view(cursor: &mut Cursor<'_>) -> Result<ViewBounds> {
	let x = cursor.read_f32()?;
	let y = cursor.read_f32()?;
	Ok(ViewBounds {
		center: Vec2::new(f64::from(x), f64::from(y)),
		width: cursor.read_f32()?,
		height: cursor.read_f32()?,
	})
}

/// Read atlas blob pairs, keeping every pair read before a failure.
fn read_atlases(cursor: &mut Cursor<'_>, atlases: &mut Vec<Atlas>) -> Result<()> {
	let count = cursor.read_u16()?;
	for _ in 0..count {
		let color = cursor.read_blob()?.to_vec();
		let alpha = cursor.read_blob()?.to_vec();
		atlases.push(Atlas::new(color, alpha));
	}
	Ok(())
}

fn read_nested_assets(actor: &mut Actor, mut cursor: Cursor<'_>) {
	let declared = match cursor.read_u16() {
		Ok(count) => count,
		Err(err) => {
			actor.record_error(err);
			return;
		}
	};

	let mut blocks = BlockIter::new(cursor);
	for block in blocks.by_ref() {
		if block.kind() != Some(BlockTag::NestedActorAsset) {
			tracing::debug!(tag = block.tag, offset = block.offset, "skipping non-asset block");
			continue;
		}
		let mut cursor = block.cursor();
		let asset = cursor.read_string().and_then(|id| Ok(NestedActorAsset::new(id, cursor.read_string()?)));
		match asset {
			Ok(asset) => actor.nested_assets.push(asset),
			Err(err) => actor.record_error(err),
		}
	}
	if let Some(err) = blocks.take_error() {
		actor.record_error(err);
	}
	tracing::debug!(declared, read = actor.nested_assets.len(), "nested asset table done");
}

/// Point nested actor nodes at their asset; out-of-range indices stay unattached.
fn attach_nested_nodes(actor: &mut Actor) {
	let assets = actor.nested_assets.len();
	for component in actor.components.iter_mut().flatten() {
		let ComponentKind::NestedActorNode(nested) = &mut component.kind else {
			continue;
		};
		let Some(index) = nested.asset_index else {
			continue;
		};
		if usize::from(index) < assets {
			nested.asset = Some(usize::from(index));
		} else {
			tracing::debug!(component = component.index, asset_index = index, assets, "nested actor node references a missing asset");
		}
	}
}
