//! Bounds-checked little-endian cursor used by every section codec.

use std::io::{self, Cursor, Read};

/// Sequential reader over a borrowed byte buffer.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader {
            cursor: Cursor::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    fn ensure(&self, wanted: usize, what: &str) -> io::Result<()> {
        if self.remaining() < wanted {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Not enough bytes for {} at offset {} (need {}, have {})",
                    what,
                    self.position(),
                    wanted,
                    self.remaining()
                ),
            ));
        }
        Ok(())
    }

    pub fn read_u16_le(&mut self) -> io::Result<u16> {
        self.ensure(2, "u16")?;
        let mut buf = [0u8; 2];
        self.cursor.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        self.ensure(4, "u32")?;
        let mut buf = [0u8; 4];
        self.cursor.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        self.ensure(N, "fixed array")?;
        let mut buf = [0u8; N];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, length: usize) -> io::Result<Vec<u8>> {
        self.ensure(length, "byte run")?;
        let mut buffer = vec![0u8; length];
        self.cursor.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Everything from the current position to the end of the buffer.
    pub fn read_rest(&mut self) -> Vec<u8> {
        let start = self.position().min(self.len());
        let rest = self.cursor.get_ref()[start..].to_vec();
        self.cursor.set_position(self.len() as u64);
        rest
    }
}

/// Growable little-endian writer.
#[derive(Default)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn write_u16_le(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values_in_order() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xAA];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0x12345678);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read_rest(), vec![0xAA]);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read_rest().is_empty());
    }

    #[test]
    fn short_reads_fail_without_advancing() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = ByteReader::new(&data);
        reader.read_bytes(1).unwrap();

        let err = reader.read_u32_le().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_u16_le().unwrap(), 0x0302);
        assert!(reader.read_array::<1>().is_err());
    }

    #[test]
    fn writer_appends_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u32_le(0xDEADBEEF);
        writer.write_u16_le(0xBEEF);
        writer.write_bytes(&[1, 2]);
        assert_eq!(writer.len(), 8);

        assert_eq!(
            writer.into_inner(),
            vec![0xEF, 0xBE, 0xAD, 0xDE, 0xEF, 0xBE, 1, 2]
        );
    }
}
