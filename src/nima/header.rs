use crate::nima::bytes::Cursor;
use crate::nima::{DataVersion, NimaError, Result};

/// Handling of a document whose first four bytes are not `NIMA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePolicy {
	/// Reject the document with [`NimaError::BadSignature`].
	#[default]
	Strict,
	/// Log the mismatch and keep reading the version and blocks.
	Lenient,
}

/// Parsed document header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NimaHeader {
	/// Leading four bytes as stored.
	pub magic: [u8; 4],
	/// Version word as stored.
	pub raw_version: u32,
	/// Data version after legacy remapping.
	pub version: DataVersion,
}

impl NimaHeader {
	/// Expected document signature.
	pub const MAGIC: [u8; 4] = *b"NIMA";
	/// Header size in bytes; blocks start right after it.
	pub const SIZE: usize = 8;

	/// Parse the header from the beginning of `bytes`.
	pub fn parse(bytes: &[u8], policy: SignaturePolicy) -> Result<Self> {
		let mut cursor = Cursor::new(bytes);
		let magic = match cursor.read_code4() {
			Ok(magic) => magic,
			Err(_) if policy == SignaturePolicy::Strict => return Err(NimaError::BadSignature { magic: first4(bytes) }),
			Err(err) => return Err(err),
		};

		if magic != Self::MAGIC {
			if policy == SignaturePolicy::Strict {
				return Err(NimaError::BadSignature { magic });
			}
			tracing::warn!(?magic, "bad nima signature, continuing leniently");
		}

		let raw_version = cursor.read_u32()?;
		Ok(Self {
			magic,
			raw_version,
			version: DataVersion::from_raw(raw_version),
		})
	}

	/// Return `true` when the stored signature matched.
	pub fn signature_ok(&self) -> bool {
		self.magic == Self::MAGIC
	}
}

fn first4(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	let take = bytes.len().min(4);
	magic[..take].copy_from_slice(&bytes[..take]);
	magic
}
