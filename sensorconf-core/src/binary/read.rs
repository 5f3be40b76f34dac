use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

/// Последовательный читатель little-endian полей из байтового среза.
///
/// Нехватка байтов возвращается как `io::ErrorKind::UnexpectedEof`.
pub struct FieldReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }

    pub fn read_i16(&mut self) -> std::io::Result<i16> {
        self.cursor.read_i16::<LittleEndian>()
    }

    pub fn read_i32(&mut self) -> std::io::Result<i32> {
        self.cursor.read_i32::<LittleEndian>()
    }

    pub fn read_f32(&mut self) -> std::io::Result<f32> {
        self.cursor.read_f32::<LittleEndian>()
    }

    /// Читает `N` байт как есть.
    pub fn read_bytes<const N: usize>(&mut self) -> std::io::Result<[u8; N]> {
        let mut out = [0u8; N];
        self.cursor.read_exact(&mut out)?;
        Ok(out)
    }

    /// Текущее смещение от начала среза.
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }
}
