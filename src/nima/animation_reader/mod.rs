use crate::nima::bytes::Cursor;
use crate::nima::{
	Actor, AnimatedComponent, AnimatedProperty, Animation, AnimationHeader, Block, BlockIter, BlockTag, ComponentKind, DecodeLayout, DrawOrderEntry,
	Interpolation, InterpolationOrder, KeyFrame, KeyFrameValue, NimaError, PropertyFraming, PropertyType, Result,
};

/// Decode an `Animations` block payload, appending one [`Animation`] per nested block.
///
/// Must run after the component list is decoded: keyed component indices resolve against it.
pub(crate) fn read_animations_block(actor: &mut Actor, mut cursor: Cursor<'_>, layout: &DecodeLayout) {
	let declared = match cursor.read_u16() {
		Ok(count) => count,
		Err(err) => {
			actor.record_error(err);
			return;
		}
	};

	let mut blocks = BlockIter::new(cursor);
	for block in blocks.by_ref() {
		if block.kind() != Some(BlockTag::Animation) {
			tracing::debug!(tag = block.tag, offset = block.offset, "skipping non-animation block");
			continue;
		}

		let mut animation = Animation::default();
		if let Err(err) = read_animation(actor, &mut block.cursor(), layout, &mut animation) {
			actor.record_error(err);
		}
		tracing::debug!(name = %animation.name, tracks = animation.components.len(), triggers = animation.trigger_components.len(), "decoded animation");
		actor.animations.push(animation);
	}
	if let Some(err) = blocks.take_error() {
		actor.record_error(err);
	}

	tracing::debug!(declared, read = actor.animations.len(), "animations block done");
}

/// Decode one animation into `animation`; on failure the tracks decoded so far are kept.
fn read_animation(actor: &mut Actor, cursor: &mut Cursor<'_>, layout: &DecodeLayout, animation: &mut Animation) -> Result<()> {
	if layout.animation_header == AnimationHeader::Named {
		animation.name = cursor.read_string()?;
		animation.fps = cursor.read_u8()?;
		animation.duration = cursor.read_f32()?;
		animation.looping = cursor.read_bool()?;
	}

	let keyed = cursor.read_u16()?;
	for _ in 0..keyed {
		let component_index = cursor.read_u16()?;
		let Some(component) = actor.component(usize::from(component_index)) else {
			skip_unresolved_component(cursor, component_index, layout)?;
			continue;
		};

		let is_event = component.is_event();
		let mut animated = AnimatedComponent {
			component_index,
			properties: Vec::new(),
		};
		let result = read_properties(actor, cursor, layout, component_index, &mut animated);
		if is_event {
			animation.trigger_components.push(animated);
		} else {
			animation.components.push(animated);
		}
		result?;
	}

	if keyed == 0 && cursor.is_eof() {
		return Ok(());
	}
	if layout.trailing_fps {
		animation.fps = cursor.read_u8()?;
	}
	animation.display_start = cursor.read_f32()?;
	animation.display_end = cursor.read_f32()?;
	Ok(())
}

/// Consume the property data of a keyed component that no longer resolves.
fn skip_unresolved_component(cursor: &mut Cursor<'_>, component_index: u16, layout: &DecodeLayout) -> Result<()> {
	if layout.property_framing == PropertyFraming::RawTag {
		return Err(NimaError::UnrecoverableSkew {
			component_index,
			version: layout.version.0,
		});
	}

	let count = cursor.read_u16()?;
	for _ in 0..count {
		Block::read(cursor)?;
	}
	tracing::warn!(component_index, properties = count, "skipped animation data for unresolved component");
	Ok(())
}

fn read_properties(actor: &mut Actor, cursor: &mut Cursor<'_>, layout: &DecodeLayout, component_index: u16, animated: &mut AnimatedComponent) -> Result<()> {
	let count = cursor.read_u16()?;
	for _ in 0..count {
		let property = match layout.property_framing {
			PropertyFraming::Block => {
				let block = Block::read(cursor)?;
				match read_property(actor, &mut block.cursor(), layout, block.tag, component_index) {
					Ok(property) => property,
					Err(err) => {
						actor.record_error(err);
						None
					}
				}
			}
			PropertyFraming::RawTag => {
				let tag = cursor.read_u8()?;
				read_property(actor, cursor, layout, tag, component_index)?
			}
		};
		animated.properties.extend(property);
	}
	Ok(())
}

/// Decode one property's keyframes; `Ok(None)` for unknown property tags.
fn read_property(actor: &mut Actor, cursor: &mut Cursor<'_>, layout: &DecodeLayout, tag: u8, component_index: u16) -> Result<Option<AnimatedProperty>> {
	let Some(property_type) = PropertyType::from_u8(tag) else {
		tracing::debug!(tag, component_index, "skipping unknown animated property");
		return Ok(None);
	};

	let count = cursor.read_u16()?;
	let mut keyframes: Vec<KeyFrame> = Vec::with_capacity(usize::from(count));
	for _ in 0..count {
		let frame = read_keyframe(actor, cursor, layout, property_type, component_index)?;
		let position = keyframes.len();
		if let Some(previous) = keyframes.last_mut() {
			previous.next = Some(position);
		}
		keyframes.push(frame);
	}
	if let Some(last) = keyframes.last_mut() {
		last.next = None;
	}

	Ok(Some(AnimatedProperty { property_type, keyframes }))
}

/// Interpolation descriptor as stored in the stream.
struct Descriptor {
	/// `None` when the descriptor byte carries no curve data.
	curve: Option<Interpolation>,
	in_factor: f64,
	in_value: f32,
	out_factor: f64,
	out_value: f32,
}

fn read_descriptor(cursor: &mut Cursor<'_>) -> Result<Descriptor> {
	let mut descriptor = Descriptor {
		curve: Interpolation::with_curve_data(cursor.read_u8()?),
		in_factor: 0.0,
		in_value: 0.0,
		out_factor: 0.0,
		out_value: 0.0,
	};
	match descriptor.curve {
		Some(Interpolation::Hold) => {
			descriptor.in_factor = cursor.read_f64()?;
			descriptor.in_value = cursor.read_f32()?;
		}
		Some(_) => {
			descriptor.in_factor = cursor.read_f64()?;
			descriptor.in_value = cursor.read_f32()?;
			descriptor.out_factor = cursor.read_f64()?;
			descriptor.out_value = cursor.read_f32()?;
		}
		None => {}
	}
	Ok(descriptor)
}

fn read_keyframe(actor: &mut Actor, cursor: &mut Cursor<'_>, layout: &DecodeLayout, property_type: PropertyType, component_index: u16) -> Result<KeyFrame> {
	let time = cursor.read_f64()?;

	let before = match layout.interpolation {
		InterpolationOrder::BeforeValue if property_type.interpolates() => Some(read_descriptor(cursor)?),
		_ => None,
	};
	let value = read_value(actor, cursor, property_type, component_index)?;
	let after = match layout.interpolation {
		InterpolationOrder::AfterValue => Some(read_descriptor(cursor)?),
		_ => None,
	};

	let mut frame = KeyFrame {
		time,
		value,
		interpolation: Interpolation::Linear,
		in_factor: 0.0,
		in_value: 0.0,
		out_factor: 0.0,
		out_value: 0.0,
		next: None,
	};

	match before.or(after) {
		Some(Descriptor {
			curve: Some(curve),
			in_factor,
			in_value,
			out_factor,
			out_value,
		}) => {
			frame.interpolation = curve;
			frame.in_factor = in_factor;
			frame.in_value = in_value;
			frame.out_factor = out_factor;
			frame.out_value = out_value;
		}
		_ => {
			if let Some(scalar) = frame.value.as_f32() {
				frame.in_value = scalar;
				frame.out_value = scalar;
			}
		}
	}

	frame.interpolation = match property_type {
		PropertyType::VertexDeform => Interpolation::Linear,
		kind if !kind.interpolates() => Interpolation::Hold,
		_ => frame.interpolation,
	};

	Ok(frame)
}

fn read_value(actor: &mut Actor, cursor: &mut Cursor<'_>, property_type: PropertyType, component_index: u16) -> Result<KeyFrameValue> {
	Ok(match property_type {
		PropertyType::Trigger => KeyFrameValue::None,
		PropertyType::IntProperty => KeyFrameValue::Integer(cursor.read_i32()?),
		PropertyType::StringProperty => KeyFrameValue::String(cursor.read_string()?),
		PropertyType::BooleanProperty | PropertyType::CollisionEnabled => KeyFrameValue::Boolean(cursor.read_bool()?),
		PropertyType::DrawOrder => {
			let count = cursor.read_u16()?;
			let mut entries = Vec::with_capacity(usize::from(count));
			for _ in 0..count {
				entries.push(DrawOrderEntry {
					component_index: cursor.read_u16()?,
					order: cursor.read_u16()?,
				});
			}
			KeyFrameValue::DrawOrder(entries)
		}
		PropertyType::VertexDeform => {
			let image = actor.component_mut(usize::from(component_index)).and_then(|component| match &mut component.kind {
				ComponentKind::Image(image) => Some(image),
				_ => None,
			});
			let floats = image.as_ref().map_or(0, |image| image.vertex_count().saturating_mul(2));
			if let Some(image) = image {
				image.has_vertex_deform_animation = true;
			}
			KeyFrameValue::VertexDeform(cursor.read_f32_vec(floats)?)
		}
		PropertyType::PosX
		| PropertyType::PosY
		| PropertyType::ScaleX
		| PropertyType::ScaleY
		| PropertyType::Rotation
		| PropertyType::Opacity
		| PropertyType::Length
		| PropertyType::IkStrength
		| PropertyType::FloatProperty
		| PropertyType::ActiveChildIndex => KeyFrameValue::Float(cursor.read_f32()?),
	})
}
