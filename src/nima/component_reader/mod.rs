use kurbo::{Affine, Vec2};

use crate::nima::bytes::Cursor;
use crate::nima::{
	Actor, Block, BlockIter, BlockTag, Bone, BoneBinding, Collider, ColliderShape, Component, ComponentKind, CustomValue, DecodeLayout, IkTarget,
	Image, ImageMesh, NestedActorNode, Node, NodeLayout, NodeSolo, NimaError, Result,
};

/// Decode a `Components` block payload into `actor`, then resolve the hierarchy.
///
/// Every nested block occupies one slot; unknown tags and undecodable payloads leave an
/// empty slot so later indices keep their stored positions.
pub(crate) fn read_components_block(actor: &mut Actor, mut cursor: Cursor<'_>, layout: &DecodeLayout) {
	let declared = match cursor.read_u16() {
		Ok(count) => count,
		Err(err) => {
			actor.record_error(err);
			return;
		}
	};

	let first = actor.components.len();
	let mut blocks = BlockIter::new(cursor);
	for block in blocks.by_ref() {
		let component = match read_component(&block, layout) {
			Ok(component) => component,
			Err(err) => {
				actor.record_error(err);
				None
			}
		};
		actor.push_component(component);
	}
	if let Some(err) = blocks.take_error() {
		actor.record_error(err);
	}

	let read = actor.components.len() - first;
	if read != usize::from(declared) {
		tracing::debug!(declared, read, "component count differs from block stream");
	}

	actor.resolve_hierarchy();
}

/// Decode one component block; `Ok(None)` for tags that are not components.
pub(crate) fn read_component(block: &Block<'_>, layout: &DecodeLayout) -> Result<Option<Component>> {
	let Some(tag) = block.kind() else {
		tracing::debug!(tag = block.tag, offset = block.offset, "skipping unknown component block");
		return Ok(None);
	};

	let mut cursor = block.cursor();
	let cursor = &mut cursor;
	let node_layout = layout.node;
	let component = match tag {
		BlockTag::CustomIntProperty => read_custom_property(cursor, |cursor| Ok(CustomValue::Integer(cursor.read_i32()?)))?,
		BlockTag::CustomFloatProperty => read_custom_property(cursor, |cursor| Ok(CustomValue::Float(cursor.read_f32()?)))?,
		BlockTag::CustomStringProperty => read_custom_property(cursor, |cursor| Ok(CustomValue::String(cursor.read_string()?)))?,
		BlockTag::CustomBooleanProperty => read_custom_property(cursor, |cursor| Ok(CustomValue::Boolean(cursor.read_bool()?)))?,
		BlockTag::ColliderRectangle => read_collider(cursor, node_layout, |cursor| {
			Ok(ColliderShape::Rectangle {
				width: cursor.read_f32()?,
				height: cursor.read_f32()?,
			})
		})?,
		BlockTag::ColliderTriangle => read_collider(cursor, node_layout, |cursor| {
			Ok(ColliderShape::Triangle {
				width: cursor.read_f32()?,
				height: cursor.read_f32()?,
			})
		})?,
		BlockTag::ColliderCircle => read_collider(cursor, node_layout, |cursor| Ok(ColliderShape::Circle { radius: cursor.read_f32()? }))?,
		BlockTag::ColliderPolygon => read_collider(cursor, node_layout, |cursor| Ok(ColliderShape::Polygon { contour: read_points(cursor)? }))?,
		BlockTag::ColliderLine => read_collider(cursor, node_layout, |cursor| Ok(ColliderShape::Line { vertices: read_points(cursor)? }))?,
		BlockTag::Event => {
			let (name, parent_index) = read_base(cursor)?;
			Component::new(name, parent_index, ComponentKind::Event)
		}
		BlockTag::Node => read_node(cursor, node_layout)?.into_component(ComponentKind::Node),
		BlockTag::RootBone => read_node(cursor, node_layout)?.into_component(ComponentKind::RootBone),
		BlockTag::Bone => {
			let record = read_node(cursor, node_layout)?;
			let length = cursor.read_f32()?;
			record.into_component(|node| {
				ComponentKind::Bone(Bone {
					node,
					length,
					jelly_bones: Vec::new(),
				})
			})
		}
		BlockTag::Image => read_image(cursor, node_layout)?,
		BlockTag::IkTarget => read_ik_target(cursor, node_layout)?,
		BlockTag::NestedActorNode => read_nested_actor_node(cursor, node_layout)?,
		BlockTag::NodeSolo => {
			let record = read_node(cursor, node_layout)?;
			let active_child_index = cursor.read_f32()?;
			record.into_component(|node| ComponentKind::NodeSolo(NodeSolo { node, active_child_index }))
		}
		other => {
			tracing::debug!(tag = other.as_str(), offset = block.offset, "skipping non-component block");
			return Ok(None);
		}
	};

	Ok(Some(component))
}

struct NodeRecord {
	name: String,
	parent_index: u16,
	node: Node,
}

impl NodeRecord {
	fn into_component(self, kind: impl FnOnce(Node) -> ComponentKind) -> Component {
		Component::new(self.name, self.parent_index, kind(self.node))
	}
}

fn read_base(cursor: &mut Cursor<'_>) -> Result<(String, u16)> {
	let name = cursor.read_string()?;
	let parent_index = cursor.read_u16()?;
	Ok((name, parent_index))
}

fn read_node(cursor: &mut Cursor<'_>, layout: NodeLayout) -> Result<NodeRecord> {
	let (name, parent_index) = read_base(cursor)?;
	let translation = read_vec2(cursor)?;
	let rotation = f64::from(cursor.read_f32()?);
	let scale = read_vec2(cursor)?;
	let opacity = cursor.read_f32()?;
	let collapsed_visibility = match layout {
		NodeLayout::Basic => false,
		NodeLayout::WithCollapsedVisibility => cursor.read_bool()?,
	};

	Ok(NodeRecord {
		name,
		parent_index,
		node: Node {
			translation,
			rotation,
			scale,
			opacity,
			collapsed_visibility,
			..Node::default()
		},
	})
}

fn read_vec2(cursor: &mut Cursor<'_>) -> Result<Vec2> {
	let x = cursor.read_f32()?;
	let y = cursor.read_f32()?;
	Ok(Vec2::new(f64::from(x), f64::from(y)))
}

fn read_affine(cursor: &mut Cursor<'_>) -> Result<Affine> {
	let mut coeffs = [0.0_f64; 6];
	for coeff in &mut coeffs {
		*coeff = f64::from(cursor.read_f32()?);
	}
	Ok(Affine::new(coeffs))
}

/// Read a `u32` point count followed by interleaved x/y floats.
fn read_points(cursor: &mut Cursor<'_>) -> Result<Vec<f32>> {
	let count = cursor.read_u32()? as usize;
	let len = checked_len(cursor, count, 2)?;
	cursor.read_f32_vec(len)
}

fn checked_len(cursor: &Cursor<'_>, count: usize, per_item: usize) -> Result<usize> {
	count.checked_mul(per_item).ok_or(NimaError::UnexpectedEof {
		at: cursor.pos(),
		need: usize::MAX,
		rem: cursor.remaining(),
	})
}

fn read_custom_property(cursor: &mut Cursor<'_>, value: impl FnOnce(&mut Cursor<'_>) -> Result<CustomValue>) -> Result<Component> {
	let (name, parent_index) = read_base(cursor)?;
	let value = value(cursor)?;
	Ok(Component::new(name, parent_index, ComponentKind::CustomProperty(value)))
}

fn read_collider(cursor: &mut Cursor<'_>, layout: NodeLayout, shape: impl FnOnce(&mut Cursor<'_>) -> Result<ColliderShape>) -> Result<Component> {
	let record = read_node(cursor, layout)?;
	let collision_enabled = cursor.read_bool()?;
	let shape = shape(cursor)?;
	Ok(record.into_component(|node| {
		ComponentKind::Collider(Collider {
			node,
			collision_enabled,
			shape,
		})
	}))
}

fn read_ik_target(cursor: &mut Cursor<'_>, layout: NodeLayout) -> Result<Component> {
	let record = read_node(cursor, layout)?;
	let order = cursor.read_u16()?;
	let strength = cursor.read_f32()?;
	let invert_direction = cursor.read_bool()?;
	let count = usize::from(cursor.read_u8()?);
	let influenced_bones = cursor.read_u16_vec(count)?;

	Ok(record.into_component(|node| {
		ComponentKind::IkTarget(IkTarget {
			node,
			order,
			strength,
			invert_direction,
			influenced_bones,
		})
	}))
}

fn read_image(cursor: &mut Cursor<'_>, layout: NodeLayout) -> Result<Component> {
	let record = read_node(cursor, layout)?;
	let is_visible = cursor.read_u8()? != 0;
	let mesh = if is_visible { Some(read_image_mesh(cursor)?) } else { None };

	Ok(record.into_component(|node| {
		ComponentKind::Image(Image {
			node,
			is_visible,
			mesh,
			has_vertex_deform_animation: false,
		})
	}))
}

fn read_image_mesh(cursor: &mut Cursor<'_>) -> Result<ImageMesh> {
	let blend_mode = cursor.read_u8()?;
	let draw_order = cursor.read_u16()?;
	let atlas_index = cursor.read_u8()?;

	let bone_count = usize::from(cursor.read_u8()?);
	let mut bone_bindings = Vec::with_capacity(bone_count);
	for _ in 0..bone_count {
		let bone_index = cursor.read_u16()?;
		let bind = read_affine(cursor)?;
		bone_bindings.push(BoneBinding::new(bone_index, bind));
	}
	let override_world = if bone_bindings.is_empty() { None } else { Some(read_affine(cursor)?) };

	let vertex_count = cursor.read_u32()? as usize;
	let vertex_stride = if bone_bindings.is_empty() {
		ImageMesh::RIGID_STRIDE
	} else {
		ImageMesh::SKINNED_STRIDE
	};
	let vertex_floats = checked_len(cursor, vertex_count, vertex_stride)?;
	let vertices = cursor.read_f32_vec(vertex_floats)?;

	let triangle_count = cursor.read_u32()? as usize;
	let triangle_indices = checked_len(cursor, triangle_count, 3)?;
	let triangles = cursor.read_u16_vec(triangle_indices)?;

	Ok(ImageMesh {
		blend_mode,
		draw_order,
		atlas_index,
		bone_bindings,
		override_world,
		vertex_count,
		vertex_stride,
		vertices,
		triangles,
	})
}

fn read_nested_actor_node(cursor: &mut Cursor<'_>, layout: NodeLayout) -> Result<Component> {
	let record = read_node(cursor, layout)?;
	let is_visible = cursor.read_u8()? != 0;
	let (draw_order, asset_index) = if is_visible {
		(cursor.read_u16()?, Some(cursor.read_u16()?))
	} else {
		(0, None)
	};

	Ok(record.into_component(|node| {
		ComponentKind::NestedActorNode(NestedActorNode {
			node,
			is_visible,
			draw_order,
			asset_index,
			asset: None,
		})
	}))
}
