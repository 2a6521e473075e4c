/// Document data version after legacy remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataVersion(pub u32);

impl DataVersion {
	/// Raw version word written by the oldest producers (`1.0f32` bit pattern).
	pub const LEGACY_SENTINEL: u32 = 0x3F80_0000;
	/// Oldest on-disk layout: interpolation trails the value, fps trails the animation.
	pub const FIRST: Self = Self(1);
	/// Animations carry a name/fps/duration/loop header and interpolation precedes the value.
	pub const NAMED_ANIMATIONS: Self = Self(11);
	/// Animated properties are framed as nested blocks.
	pub const PROPERTY_BLOCKS: Self = Self(12);
	/// Nodes carry a trailing collapsed-visibility flag.
	pub const COLLAPSED_VISIBILITY: Self = Self(13);

	/// Map a raw header word to a data version.
	pub fn from_raw(raw: u32) -> Self {
		if raw == Self::LEGACY_SENTINEL { Self::FIRST } else { Self(raw) }
	}

	/// Select every per-entity decode strategy for this version.
	pub fn layout(self) -> DecodeLayout {
		DecodeLayout {
			version: self,
			node: if self >= Self::COLLAPSED_VISIBILITY {
				NodeLayout::WithCollapsedVisibility
			} else {
				NodeLayout::Basic
			},
			animation_header: if self >= Self::NAMED_ANIMATIONS {
				AnimationHeader::Named
			} else {
				AnimationHeader::Anonymous
			},
			property_framing: if self >= Self::PROPERTY_BLOCKS {
				PropertyFraming::Block
			} else {
				PropertyFraming::RawTag
			},
			interpolation: if self == Self::FIRST {
				InterpolationOrder::AfterValue
			} else if self >= Self::NAMED_ANIMATIONS {
				InterpolationOrder::BeforeValue
			} else {
				InterpolationOrder::Absent
			},
			trailing_fps: self == Self::FIRST,
		}
	}
}

/// Field layout for node-shaped components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLayout {
	/// Name, parent, translation, rotation, scale, opacity.
	Basic,
	/// [`NodeLayout::Basic`] plus a collapsed-visibility byte.
	WithCollapsedVisibility,
}

/// Placement of the animation header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationHeader {
	/// No leading header.
	Anonymous,
	/// Leading name, fps, duration and loop flag.
	Named,
}

/// How each animated property announces its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFraming {
	/// One raw tag byte followed by inline keyframes.
	RawTag,
	/// One self-describing block per property.
	Block,
}

/// Where the keyframe interpolation descriptor sits relative to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationOrder {
	/// No descriptor is stored.
	Absent,
	/// Descriptor precedes the value, skipped for non-interpolating properties.
	BeforeValue,
	/// Descriptor follows the value for every property.
	AfterValue,
}

/// Decode strategies chosen once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLayout {
	/// Version the layout was derived from.
	pub version: DataVersion,
	/// Node field layout.
	pub node: NodeLayout,
	/// Animation header placement.
	pub animation_header: AnimationHeader,
	/// Animated property framing.
	pub property_framing: PropertyFraming,
	/// Interpolation descriptor placement.
	pub interpolation: InterpolationOrder,
	/// Whether an fps byte trails each animation.
	pub trailing_fps: bool,
}
