use crate::nima::bytes::Cursor;
use crate::nima::{NimaError, Result};

/// Block tag values shared by every nesting level of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
	/// Top-level component list.
	Components,
	/// Plain transform node.
	Node,
	/// Skeletal bone.
	Bone,
	/// Skeleton root bone.
	RootBone,
	/// Textured mesh node.
	Image,
	/// Top-level view bounds.
	View,
	/// One animation inside [`BlockTag::Animations`].
	Animation,
	/// Top-level animation list.
	Animations,
	/// Top-level atlas list.
	Atlases,
	/// Reserved; atlases are stored inline in [`BlockTag::Atlases`].
	Atlas,
	/// Inverse-kinematics target.
	IkTarget,
	/// Timeline event.
	Event,
	/// Integer custom property.
	CustomIntProperty,
	/// Float custom property.
	CustomFloatProperty,
	/// String custom property.
	CustomStringProperty,
	/// Boolean custom property.
	CustomBooleanProperty,
	/// Rectangle collider.
	ColliderRectangle,
	/// Triangle collider.
	ColliderTriangle,
	/// Circle collider.
	ColliderCircle,
	/// Polygon collider.
	ColliderPolygon,
	/// Line collider.
	ColliderLine,
	/// Reserved; never emitted by current producers.
	ImageSequence,
	/// Node showing one child at a time.
	NodeSolo,
	/// Node instancing a nested actor asset.
	NestedActorNode,
	/// Top-level nested actor asset table.
	NestedActorAssets,
	/// One entry inside [`BlockTag::NestedActorAssets`].
	NestedActorAsset,
}

impl BlockTag {
	/// Map a raw tag byte to its block kind.
	pub fn from_u8(tag: u8) -> Option<Self> {
		Some(match tag {
			1 => Self::Components,
			2 => Self::Node,
			3 => Self::Bone,
			4 => Self::RootBone,
			5 => Self::Image,
			6 => Self::View,
			7 => Self::Animation,
			8 => Self::Animations,
			9 => Self::Atlases,
			10 => Self::Atlas,
			11 => Self::IkTarget,
			12 => Self::Event,
			13 => Self::CustomIntProperty,
			14 => Self::CustomFloatProperty,
			15 => Self::CustomStringProperty,
			16 => Self::CustomBooleanProperty,
			17 => Self::ColliderRectangle,
			18 => Self::ColliderTriangle,
			19 => Self::ColliderCircle,
			20 => Self::ColliderPolygon,
			21 => Self::ColliderLine,
			22 => Self::ImageSequence,
			23 => Self::NodeSolo,
			24 => Self::NestedActorNode,
			25 => Self::NestedActorAssets,
			26 => Self::NestedActorAsset,
			_ => return None,
		})
	}

	/// Raw tag byte as written by producers.
	pub fn as_u8(self) -> u8 {
		match self {
			Self::Components => 1,
			Self::Node => 2,
			Self::Bone => 3,
			Self::RootBone => 4,
			Self::Image => 5,
			Self::View => 6,
			Self::Animation => 7,
			Self::Animations => 8,
			Self::Atlases => 9,
			Self::Atlas => 10,
			Self::IkTarget => 11,
			Self::Event => 12,
			Self::CustomIntProperty => 13,
			Self::CustomFloatProperty => 14,
			Self::CustomStringProperty => 15,
			Self::CustomBooleanProperty => 16,
			Self::ColliderRectangle => 17,
			Self::ColliderTriangle => 18,
			Self::ColliderCircle => 19,
			Self::ColliderPolygon => 20,
			Self::ColliderLine => 21,
			Self::ImageSequence => 22,
			Self::NodeSolo => 23,
			Self::NestedActorNode => 24,
			Self::NestedActorAssets => 25,
			Self::NestedActorAsset => 26,
		}
	}

	/// Stable snake-case label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Components => "components",
			Self::Node => "node",
			Self::Bone => "bone",
			Self::RootBone => "root_bone",
			Self::Image => "image",
			Self::View => "view",
			Self::Animation => "animation",
			Self::Animations => "animations",
			Self::Atlases => "atlases",
			Self::Atlas => "atlas",
			Self::IkTarget => "ik_target",
			Self::Event => "event",
			Self::CustomIntProperty => "custom_int_property",
			Self::CustomFloatProperty => "custom_float_property",
			Self::CustomStringProperty => "custom_string_property",
			Self::CustomBooleanProperty => "custom_boolean_property",
			Self::ColliderRectangle => "collider_rectangle",
			Self::ColliderTriangle => "collider_triangle",
			Self::ColliderCircle => "collider_circle",
			Self::ColliderPolygon => "collider_polygon",
			Self::ColliderLine => "collider_line",
			Self::ImageSequence => "image_sequence",
			Self::NodeSolo => "node_solo",
			Self::NestedActorNode => "nested_actor_node",
			Self::NestedActorAssets => "nested_actor_assets",
			Self::NestedActorAsset => "nested_actor_asset",
		}
	}
}

/// Borrowed view over one framed block.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
	/// Raw tag byte; see [`BlockTag::from_u8`].
	pub tag: u8,
	/// Raw payload bytes.
	pub payload: &'a [u8],
	/// Offset of the tag byte within the parent buffer.
	pub offset: usize,
}

impl<'a> Block<'a> {
	/// Read one `{u8 tag, u32 length, payload}` record from cursor position.
	pub fn read(cursor: &mut Cursor<'a>) -> Result<Self> {
		let offset = cursor.pos();
		let tag = cursor.read_u8()?;
		let len = cursor.read_u32()?;

		let rem = cursor.remaining();
		let payload_len = len as usize;
		if payload_len > rem {
			return Err(NimaError::BlockLenOutOfRange { tag, at: offset, len, rem });
		}

		let payload = cursor.read_exact(payload_len)?;
		Ok(Self { tag, payload, offset })
	}

	/// Known kind for this block, if any.
	pub fn kind(&self) -> Option<BlockTag> {
		BlockTag::from_u8(self.tag)
	}

	/// Fresh cursor over just this block's payload.
	pub fn cursor(&self) -> Cursor<'a> {
		Cursor::new(self.payload)
	}
}

/// Iterator over consecutive blocks until end of buffer.
///
/// A read failure ends iteration without yielding a block; the failure is kept and can be
/// collected with [`BlockIter::take_error`].
#[derive(Debug)]
pub struct BlockIter<'a> {
	cursor: Cursor<'a>,
	error: Option<NimaError>,
	done: bool,
}

impl<'a> BlockIter<'a> {
	/// Iterate blocks from the current position of `cursor`.
	pub fn new(cursor: Cursor<'a>) -> Self {
		Self {
			cursor,
			error: None,
			done: false,
		}
	}

	/// Take the read failure that stopped iteration, if one occurred.
	pub fn take_error(&mut self) -> Option<NimaError> {
		self.error.take()
	}
}

impl<'a> Iterator for BlockIter<'a> {
	type Item = Block<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		if self.cursor.is_eof() {
			self.done = true;
			return None;
		}

		match Block::read(&mut self.cursor) {
			Ok(block) => Some(block),
			Err(err) => {
				self.done = true;
				self.error = Some(err);
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::nima::bytes::Cursor;
	use crate::nima::{Block, BlockIter, BlockTag, NimaError};

	fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
		let mut out = vec![tag];
		out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
		out.extend_from_slice(payload);
		out
	}

	#[test]
	fn iterates_consecutive_blocks() {
		let mut bytes = frame(6, &[1, 2, 3]);
		bytes.extend(frame(99, &[]));

		let blocks: Vec<Block<'_>> = BlockIter::new(Cursor::new(&bytes)).collect();
		assert_eq!(blocks.len(), 2);
		assert_eq!(blocks[0].kind(), Some(BlockTag::View));
		assert_eq!(blocks[0].payload, &[1, 2, 3]);
		assert_eq!(blocks[1].tag, 99);
		assert_eq!(blocks[1].kind(), None);
		assert_eq!(blocks[1].offset, 8);
	}

	#[test]
	fn truncated_payload_ends_iteration_with_error() {
		let mut bytes = frame(1, &[0, 0]);
		bytes.extend_from_slice(&[8, 10, 0, 0, 0, 1, 2]);

		let mut iter = BlockIter::new(Cursor::new(&bytes));
		assert!(iter.next().is_some(), "first block is complete");
		assert!(iter.next().is_none(), "second block is truncated");
		assert!(iter.next().is_none(), "iteration stays finished");

		let err = iter.take_error().expect("truncation is reported");
		assert!(matches!(err, NimaError::BlockLenOutOfRange { tag: 8, at: 7, len: 10, rem: 2 }));
	}

	#[test]
	fn tag_table_round_trips_every_known_byte() {
		for raw in 0_u8..=255 {
			if let Some(tag) = BlockTag::from_u8(raw) {
				assert_eq!(tag.as_u8(), raw, "tag {} should map back to its byte", tag.as_str());
			}
		}
		assert_eq!(BlockTag::from_u8(0), None);
		assert_eq!(BlockTag::from_u8(27), None);
	}
}
