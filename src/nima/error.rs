use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, NimaError>;

/// Errors produced while reading, decoding, and resolving NIMA documents.
#[derive(Debug, Error)]
pub enum NimaError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Leading four bytes are not the `NIMA` signature.
	#[error("bad signature (magic={magic:?}, expected \"NIMA\")")]
	BadSignature {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Block payload would exceed remaining buffer data.
	#[error("block tag {tag} at offset {at} declares length {len}, remaining {rem}")]
	BlockLenOutOfRange {
		/// Block tag byte.
		tag: u8,
		/// Offset of the block tag within its parent buffer.
		at: usize,
		/// Declared payload length.
		len: u32,
		/// Remaining bytes after the block header.
		rem: usize,
	},
	/// Animated component index did not resolve and the stream predates property blocks.
	#[error("animated component {component_index} does not resolve; data version {version} cannot skip its properties")]
	UnrecoverableSkew {
		/// Keyed component index read from the stream.
		component_index: u16,
		/// Document data version.
		version: u32,
	},
	/// Image service failed to decode or composite image bytes.
	#[error("image: {reason}")]
	Image {
		/// Failure description from the image backend.
		reason: String,
	},
	/// Color and alpha atlas images differ in size.
	#[error("atlas size mismatch: color {color:?}, alpha {alpha:?}")]
	AtlasSizeMismatch {
		/// Color image dimensions.
		color: (u32, u32),
		/// Alpha image dimensions.
		alpha: (u32, u32),
	},
	/// One atlas failed to resolve.
	#[error("atlas {index}: {source}")]
	Atlas {
		/// Atlas position in the document.
		index: usize,
		/// Underlying failure.
		#[source]
		source: Box<NimaError>,
	},
	/// One nested actor asset failed to load.
	#[error("nested actor {id:?}: {source}")]
	NestedLoad {
		/// Asset id as stored in the document.
		id: String,
		/// Underlying failure.
		#[source]
		source: Box<NimaError>,
	},
	/// Nested asset path is absolute or climbs out of the asset directory.
	#[error("nested asset path {path:?} leaves the asset directory")]
	NestedPathEscapes {
		/// Path as stored in the document.
		path: String,
	},
	/// Nested actor recursion exceeded the configured depth.
	#[error("nested actor depth exceeded (max={max_depth})")]
	NestedDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Load was cancelled before all pending work completed.
	#[error("load cancelled")]
	Cancelled,
}

impl From<image::ImageError> for NimaError {
	fn from(err: image::ImageError) -> Self {
		Self::Image { reason: err.to_string() }
	}
}
