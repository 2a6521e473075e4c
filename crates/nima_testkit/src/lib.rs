//! Shared test helpers: a byte-level NIMA document writer and workspace paths.

use std::path::{Path, PathBuf};

/// Raw tag bytes used by the document writer.
pub mod tags {
	/// Top-level component list.
	pub const COMPONENTS: u8 = 1;
	/// Plain node.
	pub const NODE: u8 = 2;
	/// Bone.
	pub const BONE: u8 = 3;
	/// Root bone.
	pub const ROOT_BONE: u8 = 4;
	/// Image.
	pub const IMAGE: u8 = 5;
	/// View bounds.
	pub const VIEW: u8 = 6;
	/// One animation.
	pub const ANIMATION: u8 = 7;
	/// Animation list.
	pub const ANIMATIONS: u8 = 8;
	/// Atlas list.
	pub const ATLASES: u8 = 9;
	/// IK target.
	pub const IK_TARGET: u8 = 11;
	/// Event.
	pub const EVENT: u8 = 12;
	/// Integer custom property.
	pub const CUSTOM_INT: u8 = 13;
	/// Float custom property.
	pub const CUSTOM_FLOAT: u8 = 14;
	/// String custom property.
	pub const CUSTOM_STRING: u8 = 15;
	/// Boolean custom property.
	pub const CUSTOM_BOOLEAN: u8 = 16;
	/// Rectangle collider.
	pub const COLLIDER_RECTANGLE: u8 = 17;
	/// Triangle collider.
	pub const COLLIDER_TRIANGLE: u8 = 18;
	/// Circle collider.
	pub const COLLIDER_CIRCLE: u8 = 19;
	/// Polygon collider.
	pub const COLLIDER_POLYGON: u8 = 20;
	/// Line collider.
	pub const COLLIDER_LINE: u8 = 21;
	/// Node solo.
	pub const NODE_SOLO: u8 = 23;
	/// Nested actor node.
	pub const NESTED_ACTOR_NODE: u8 = 24;
	/// Nested actor asset table.
	pub const NESTED_ACTOR_ASSETS: u8 = 25;
	/// One nested actor asset.
	pub const NESTED_ACTOR_ASSET: u8 = 26;
}

/// Raw animated property tags.
pub mod props {
	/// Translation x.
	pub const POS_X: u8 = 1;
	/// Rotation.
	pub const ROTATION: u8 = 5;
	/// Opacity.
	pub const OPACITY: u8 = 6;
	/// Draw order.
	pub const DRAW_ORDER: u8 = 7;
	/// Vertex deform.
	pub const VERTEX_DEFORM: u8 = 9;
	/// Event trigger.
	pub const TRIGGER: u8 = 11;
	/// Integer custom property.
	pub const INT_PROPERTY: u8 = 12;
	/// String custom property.
	pub const STRING_PROPERTY: u8 = 14;
	/// Boolean custom property.
	pub const BOOLEAN_PROPERTY: u8 = 15;
}

/// Little-endian byte writer mirroring the document reader.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
	bytes: Vec<u8>,
}

impl ByteWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Finish and return written bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}

	/// Bytes written so far.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Write raw bytes.
	pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
		self.bytes.extend_from_slice(bytes);
		self
	}

	/// Write one byte.
	pub fn u8(&mut self, value: u8) -> &mut Self {
		self.bytes.push(value);
		self
	}

	/// Write a boolean byte.
	pub fn bool(&mut self, value: bool) -> &mut Self {
		self.u8(u8::from(value))
	}

	/// Write a `u16`.
	pub fn u16(&mut self, value: u16) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Write a `u32`.
	pub fn u32(&mut self, value: u32) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Write an `i32`.
	pub fn i32(&mut self, value: i32) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Write an `f32`.
	pub fn f32(&mut self, value: f32) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Write an `f64`.
	pub fn f64(&mut self, value: f64) -> &mut Self {
		self.raw(&value.to_le_bytes())
	}

	/// Write consecutive `f32` values.
	pub fn f32s(&mut self, values: &[f32]) -> &mut Self {
		for value in values {
			self.f32(*value);
		}
		self
	}

	/// Write a `u32` length-prefixed UTF-8 string.
	pub fn string(&mut self, value: &str) -> &mut Self {
		self.u32(value.len() as u32).raw(value.as_bytes())
	}

	/// Write a `u32` length-prefixed blob.
	pub fn blob(&mut self, bytes: &[u8]) -> &mut Self {
		self.u32(bytes.len() as u32).raw(bytes)
	}

	/// Write a `{tag, length, payload}` block whose payload is produced by `body`.
	pub fn block(&mut self, tag: u8, body: impl FnOnce(&mut ByteWriter)) -> &mut Self {
		let mut inner = ByteWriter::new();
		body(&mut inner);
		self.u8(tag).blob(&inner.bytes)
	}

	/// Write component base fields.
	pub fn component_base(&mut self, name: &str, parent: u16) -> &mut Self {
		self.string(name).u16(parent)
	}

	/// Write node fields; `collapsed` is only written for data version 13 and later.
	pub fn node(&mut self, name: &str, parent: u16, fields: &NodeFields, collapsed: Option<bool>) -> &mut Self {
		self.component_base(name, parent)
			.f32s(&fields.translation)
			.f32(fields.rotation)
			.f32s(&fields.scale)
			.f32(fields.opacity);
		if let Some(flag) = collapsed {
			self.bool(flag);
		}
		self
	}
}

/// Node transform values used by [`ByteWriter::node`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeFields {
	/// Translation x/y.
	pub translation: [f32; 2],
	/// Rotation.
	pub rotation: f32,
	/// Scale x/y.
	pub scale: [f32; 2],
	/// Opacity.
	pub opacity: f32,
}

impl Default for NodeFields {
	fn default() -> Self {
		Self {
			translation: [0.0, 0.0],
			rotation: 0.0,
			scale: [1.0, 1.0],
			opacity: 1.0,
		}
	}
}

/// Build a document: signature, version word, then blocks written by `body`.
pub fn document(version: u32, body: impl FnOnce(&mut ByteWriter)) -> Vec<u8> {
	let mut writer = ByteWriter::new();
	writer.raw(b"NIMA").u32(version);
	body(&mut writer);
	writer.into_bytes()
}

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Write `bytes` to a scratch file under the target directory and return its path.
pub fn scratch_file(name: &str, bytes: &[u8]) -> PathBuf {
	let dir = target_dir().join("nima_testkit");
	std::fs::create_dir_all(&dir).expect("scratch dir is creatable");
	let path = dir.join(name);
	std::fs::write(&path, bytes).expect("scratch file is writable");
	path
}
