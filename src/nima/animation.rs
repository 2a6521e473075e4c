/// One named animation clip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Animation {
	/// Clip name (empty before data version 11).
	pub name: String,
	/// Authoring frame rate.
	pub fps: u8,
	/// Duration in seconds.
	pub duration: f32,
	/// Whether playback loops.
	pub looping: bool,
	/// Editor display range start.
	pub display_start: f32,
	/// Editor display range end.
	pub display_end: f32,
	/// Tracks for non-event components.
	pub components: Vec<AnimatedComponent>,
	/// Tracks for event components; only triggers are keyed on events.
	pub trigger_components: Vec<AnimatedComponent>,
}

impl Animation {
	/// Total keyframe count across regular and trigger tracks.
	pub fn keyframe_count(&self) -> usize {
		self.components
			.iter()
			.chain(&self.trigger_components)
			.flat_map(|component| &component.properties)
			.map(|property| property.keyframes.len())
			.sum()
	}
}

/// Keyed properties of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedComponent {
	/// Index into the actor's component list.
	pub component_index: u16,
	/// Keyed properties in stream order.
	pub properties: Vec<AnimatedProperty>,
}

/// Keyframes of one property.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedProperty {
	/// Property being keyed.
	pub property_type: PropertyType,
	/// Keyframes in stream order, which producers write in ascending time.
	pub keyframes: Vec<KeyFrame>,
}

impl AnimatedProperty {
	/// Follow `next` links from the first keyframe.
	pub fn linked(&self) -> LinkedKeyFrames<'_> {
		LinkedKeyFrames {
			keyframes: &self.keyframes,
			at: if self.keyframes.is_empty() { None } else { Some(0) },
		}
	}

	/// Check that keyframe times never decrease.
	pub fn is_time_ordered(&self) -> bool {
		self.keyframes.windows(2).all(|pair| pair[0].time <= pair[1].time)
	}
}

/// Iterator over a property's keyframes by forward link.
#[derive(Debug, Clone)]
pub struct LinkedKeyFrames<'a> {
	keyframes: &'a [KeyFrame],
	at: Option<usize>,
}

impl<'a> Iterator for LinkedKeyFrames<'a> {
	type Item = &'a KeyFrame;

	fn next(&mut self) -> Option<Self::Item> {
		let frame = self.keyframes.get(self.at?)?;
		self.at = frame.next;
		Some(frame)
	}
}

/// Animatable property kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
	/// Translation x.
	PosX,
	/// Translation y.
	PosY,
	/// Scale x.
	ScaleX,
	/// Scale y.
	ScaleY,
	/// Rotation.
	Rotation,
	/// Opacity.
	Opacity,
	/// Image draw order reassignment.
	DrawOrder,
	/// Bone length.
	Length,
	/// Per-vertex mesh offsets.
	VertexDeform,
	/// IK strength.
	IkStrength,
	/// Event trigger.
	Trigger,
	/// Integer custom property.
	IntProperty,
	/// Float custom property.
	FloatProperty,
	/// String custom property.
	StringProperty,
	/// Boolean custom property.
	BooleanProperty,
	/// Collider enable flag.
	CollisionEnabled,
	/// Node solo active child.
	ActiveChildIndex,
}

impl PropertyType {
	/// Map a raw property tag to its kind.
	pub fn from_u8(tag: u8) -> Option<Self> {
		Some(match tag {
			1 => Self::PosX,
			2 => Self::PosY,
			3 => Self::ScaleX,
			4 => Self::ScaleY,
			5 => Self::Rotation,
			6 => Self::Opacity,
			7 => Self::DrawOrder,
			8 => Self::Length,
			9 => Self::VertexDeform,
			10 => Self::IkStrength,
			11 => Self::Trigger,
			12 => Self::IntProperty,
			13 => Self::FloatProperty,
			14 => Self::StringProperty,
			15 => Self::BooleanProperty,
			16 => Self::CollisionEnabled,
			18 => Self::ActiveChildIndex,
			_ => return None,
		})
	}

	/// Raw property tag.
	pub fn as_u8(self) -> u8 {
		match self {
			Self::PosX => 1,
			Self::PosY => 2,
			Self::ScaleX => 3,
			Self::ScaleY => 4,
			Self::Rotation => 5,
			Self::Opacity => 6,
			Self::DrawOrder => 7,
			Self::Length => 8,
			Self::VertexDeform => 9,
			Self::IkStrength => 10,
			Self::Trigger => 11,
			Self::IntProperty => 12,
			Self::FloatProperty => 13,
			Self::StringProperty => 14,
			Self::BooleanProperty => 15,
			Self::CollisionEnabled => 16,
			Self::ActiveChildIndex => 18,
		}
	}

	/// Whether keyframes of this property carry an interpolation descriptor.
	pub fn interpolates(self) -> bool {
		!matches!(
			self,
			Self::DrawOrder | Self::Trigger | Self::StringProperty | Self::BooleanProperty | Self::ActiveChildIndex | Self::CollisionEnabled
		)
	}

	/// Stable snake-case label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::PosX => "pos_x",
			Self::PosY => "pos_y",
			Self::ScaleX => "scale_x",
			Self::ScaleY => "scale_y",
			Self::Rotation => "rotation",
			Self::Opacity => "opacity",
			Self::DrawOrder => "draw_order",
			Self::Length => "length",
			Self::VertexDeform => "vertex_deform",
			Self::IkStrength => "ik_strength",
			Self::Trigger => "trigger",
			Self::IntProperty => "int_property",
			Self::FloatProperty => "float_property",
			Self::StringProperty => "string_property",
			Self::BooleanProperty => "boolean_property",
			Self::CollisionEnabled => "collision_enabled",
			Self::ActiveChildIndex => "active_child_index",
		}
	}
}

/// Keyframe interpolation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
	/// Step function.
	Hold,
	/// Straight blend.
	Linear,
	/// Cubic with mirrored tangents.
	Mirrored,
	/// Cubic with independent tangent lengths.
	Asymmetric,
	/// Cubic with independent tangents.
	Disconnected,
}

impl Interpolation {
	/// Map a descriptor byte to an interpolation that carries curve data.
	///
	/// Returns `None` for bytes without curve data, which mirror the value instead.
	pub fn with_curve_data(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Hold),
			2 => Some(Self::Mirrored),
			3 => Some(Self::Asymmetric),
			4 => Some(Self::Disconnected),
			_ => None,
		}
	}

	/// Stable snake-case label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hold => "hold",
			Self::Linear => "linear",
			Self::Mirrored => "mirrored",
			Self::Asymmetric => "asymmetric",
			Self::Disconnected => "disconnected",
		}
	}
}

/// One keyframe.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrame {
	/// Time in seconds.
	pub time: f64,
	/// Keyed value.
	pub value: KeyFrameValue,
	/// Interpolation toward the next keyframe.
	pub interpolation: Interpolation,
	/// Incoming tangent time factor.
	pub in_factor: f64,
	/// Incoming tangent value.
	pub in_value: f32,
	/// Outgoing tangent time factor.
	pub out_factor: f64,
	/// Outgoing tangent value.
	pub out_value: f32,
	/// Position of the following keyframe in the same property.
	pub next: Option<usize>,
}

/// Value payload of a keyframe.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFrameValue {
	/// Trigger keys carry no value.
	None,
	/// Integer value.
	Integer(i32),
	/// Float value.
	Float(f32),
	/// String value.
	String(String),
	/// Boolean value.
	Boolean(bool),
	/// Draw order reassignment.
	DrawOrder(Vec<DrawOrderEntry>),
	/// Interleaved x/y vertex offsets.
	VertexDeform(Vec<f32>),
}

impl KeyFrameValue {
	/// Scalar view of numeric values.
	pub fn as_f32(&self) -> Option<f32> {
		match self {
			Self::Float(value) => Some(*value),
			_ => None,
		}
	}
}

/// One draw order assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOrderEntry {
	/// Component index of the image.
	pub component_index: u16,
	/// New draw order value.
	pub order: u16,
}

#[cfg(test)]
mod tests {
	use crate::nima::{AnimatedProperty, Interpolation, KeyFrame, KeyFrameValue, PropertyType};

	fn key(time: f64, next: Option<usize>) -> KeyFrame {
		KeyFrame {
			time,
			value: KeyFrameValue::Float(0.0),
			interpolation: Interpolation::Linear,
			in_factor: 0.0,
			in_value: 0.0,
			out_factor: 0.0,
			out_value: 0.0,
			next,
		}
	}

	#[test]
	fn property_tags_round_trip() {
		for raw in 0_u8..=32 {
			if let Some(kind) = PropertyType::from_u8(raw) {
				assert_eq!(kind.as_u8(), raw, "{} should map back", kind.as_str());
			}
		}
		assert_eq!(PropertyType::from_u8(17), None, "sequence tag is not supported");
	}

	#[test]
	fn non_interpolating_set() {
		assert!(!PropertyType::DrawOrder.interpolates());
		assert!(!PropertyType::ActiveChildIndex.interpolates());
		assert!(PropertyType::VertexDeform.interpolates());
		assert!(PropertyType::Rotation.interpolates());
	}

	#[test]
	fn linked_iteration_follows_next() {
		let property = AnimatedProperty {
			property_type: PropertyType::PosX,
			keyframes: vec![key(0.0, Some(1)), key(0.5, Some(2)), key(1.0, None)],
		};
		let times: Vec<f64> = property.linked().map(|frame| frame.time).collect();
		assert_eq!(times, vec![0.0, 0.5, 1.0]);
		assert!(property.is_time_ordered());
	}

	#[test]
	fn time_order_check_flags_regression() {
		let property = AnimatedProperty {
			property_type: PropertyType::PosX,
			keyframes: vec![key(1.0, Some(1)), key(0.5, None)],
		};
		assert!(!property.is_time_ordered());
	}
}
