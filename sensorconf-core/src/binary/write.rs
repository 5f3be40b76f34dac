use byteorder::{ByteOrder, LittleEndian};

/// Последовательный писатель little-endian полей в буфер фиксированного
/// размера. Размер буфера задаёт вызывающий код, выход за границы является ошибкой
/// программиста (panic).
pub struct FieldWriter<'a> {
    buf: &'a mut [u8],
    off: usize,
}

impl<'a> FieldWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, off: 0 }
    }

    pub fn write_i16(
        &mut self,
        val: i16,
    ) {
        LittleEndian::write_i16(&mut self.buf[self.off..self.off + 2], val);
        self.off += 2;
    }

    pub fn write_i32(
        &mut self,
        val: i32,
    ) {
        LittleEndian::write_i32(&mut self.buf[self.off..self.off + 4], val);
        self.off += 4;
    }

    pub fn write_f32(
        &mut self,
        val: f32,
    ) {
        LittleEndian::write_f32(&mut self.buf[self.off..self.off + 4], val);
        self.off += 4;
    }

    pub fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) {
        self.buf[self.off..self.off + bytes.len()].copy_from_slice(bytes);
        self.off += bytes.len();
    }

    /// Сколько байт уже записано.
    pub fn position(&self) -> usize {
        self.off
    }
}
