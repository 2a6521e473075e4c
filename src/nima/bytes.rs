use crate::nima::{NimaError, Result};

/// Simple bounded little-endian cursor over an immutable byte slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Return `true` once every byte has been consumed.
	pub fn is_eof(&self) -> bool {
		self.remaining() == 0
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(NimaError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		self.read_array()
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read one byte and interpret `1` as `true`.
	pub fn read_bool(&mut self) -> Result<bool> {
		Ok(self.read_u8()? == 1)
	}

	/// Read a little-endian `u16`.
	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u32`.
	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `f32`.
	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(f32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `f64`.
	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.read_array()?))
	}

	/// Read `count` little-endian `f32` values.
	pub fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>> {
		let need = count.checked_mul(4).ok_or(NimaError::UnexpectedEof {
			at: self.pos,
			need: usize::MAX,
			rem: self.remaining(),
		})?;
		let raw = self.read_exact(need)?;
		Ok(raw
			.chunks_exact(4)
			.map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
			.collect())
	}

	/// Read `count` little-endian `u16` values.
	pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
		let need = count.checked_mul(2).ok_or(NimaError::UnexpectedEof {
			at: self.pos,
			need: usize::MAX,
			rem: self.remaining(),
		})?;
		let raw = self.read_exact(need)?;
		Ok(raw.chunks_exact(2).map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]])).collect())
	}

	/// Read a `u32` length-prefixed UTF-8 string; invalid sequences are replaced.
	pub fn read_string(&mut self) -> Result<String> {
		let len = self.read_u32()? as usize;
		let raw = self.read_exact(len)?;
		Ok(String::from_utf8_lossy(raw).into_owned())
	}

	/// Read a `u32` length-prefixed byte blob.
	pub fn read_blob(&mut self) -> Result<&'a [u8]> {
		let len = self.read_u32()? as usize;
		self.read_exact(len)
	}
}

#[cfg(test)]
mod tests {
	use crate::nima::NimaError;
	use crate::nima::bytes::Cursor;

	#[test]
	fn reads_little_endian_scalars() {
		let mut bytes = Vec::new();
		bytes.push(7_u8);
		bytes.extend_from_slice(&0xBEEF_u16.to_le_bytes());
		bytes.extend_from_slice(&(-5_i32).to_le_bytes());
		bytes.extend_from_slice(&1.5_f32.to_le_bytes());
		bytes.extend_from_slice(&0.25_f64.to_le_bytes());

		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_u8().expect("u8"), 7);
		assert_eq!(cursor.read_u16().expect("u16"), 0xBEEF);
		assert_eq!(cursor.read_i32().expect("i32"), -5);
		assert_eq!(cursor.read_f32().expect("f32"), 1.5);
		assert_eq!(cursor.read_f64().expect("f64"), 0.25);
		assert!(cursor.is_eof());
	}

	#[test]
	fn reads_length_prefixed_string() {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&4_u32.to_le_bytes());
		bytes.extend_from_slice(b"Root");

		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_string().expect("string reads"), "Root");
		assert_eq!(cursor.pos(), 8);
	}

	#[test]
	fn truncated_read_reports_offset_and_shortfall() {
		let bytes = [1_u8, 2, 3];
		let mut cursor = Cursor::new(&bytes);
		cursor.read_u8().expect("first byte");

		let err = cursor.read_u32().expect_err("short read should fail");
		assert!(matches!(err, NimaError::UnexpectedEof { at: 1, need: 4, rem: 2 }));
		assert_eq!(cursor.pos(), 1, "failed read must not advance");
	}

	#[test]
	fn reads_float_arrays() {
		let mut bytes = Vec::new();
		for value in [1.0_f32, -2.0, 3.5] {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(cursor.read_f32_vec(3).expect("floats"), vec![1.0, -2.0, 3.5]);
	}
}
