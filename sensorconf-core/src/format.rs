//! Бинарное представление записи конфигурации сенсора и её зеркала.
//!
//! Запись (28 байт, little-endian):
//!
//! | смещение | размер | поле                |
//! |----------|--------|---------------------|
//! | 0        | 2      | active_pixel_width  |
//! | 2        | 2      | active_pixel_height |
//! | 4        | 2      | pixel_array_width   |
//! | 6        | 2      | pixel_array_height  |
//! | 8        | 4      | sensor_timing       |
//! | 12       | 4      | output_timing       |
//! | 16       | 8      | unknown (как есть)  |
//! | 24       | 4      | fps (f32)           |
//!
//! Зеркало (8 байт): ширина и высота как i32 little-endian.

use std::io::{Read, Seek, SeekFrom};

use sensorconf_types::{
    ConfigurationRecord, MirroredDimensions, RecordField, SensorConfResult, MIRROR_SIZE,
    RECORD_SIZE,
};

use crate::binary::{FieldReader, FieldWriter};

/// Кодек записи конфигурации.
pub trait ConfigurationRecordExt: Sized {
    /// Сериализация записи ровно в 28 байт.
    fn encode(&self) -> [u8; RECORD_SIZE];

    /// Десериализация из начала среза. Меньше 28 байт: `Io(UnexpectedEof)`.
    fn decode_slice(buf: &[u8]) -> SensorConfResult<Self>;

    /// Читает ровно 28 байт начиная с `offset`.
    fn decode<R: Read + Seek>(
        reader: &mut R,
        offset: u64,
    ) -> SensorConfResult<Self>;

    /// Однострочное диагностическое представление.
    fn render(&self) -> String;

    /// Поля, значения которых отличаются от `other`, в порядке таблицы.
    fn changed_fields(
        &self,
        other: &Self,
    ) -> Vec<RecordField>;
}

/// Кодек зеркала ширины/высоты.
pub trait MirroredDimensionsExt: Sized {
    fn encode(&self) -> [u8; MIRROR_SIZE];

    fn decode_slice(buf: &[u8]) -> SensorConfResult<Self>;

    fn decode<R: Read + Seek>(
        reader: &mut R,
        offset: u64,
    ) -> SensorConfResult<Self>;
}

impl ConfigurationRecordExt for ConfigurationRecord {
    fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        let mut w = FieldWriter::new(&mut buf);

        w.write_i16(self.active_pixel_width);
        w.write_i16(self.active_pixel_height);
        w.write_i16(self.pixel_array_width);
        w.write_i16(self.pixel_array_height);
        w.write_i32(self.sensor_timing);
        w.write_i32(self.output_timing);
        w.write_bytes(&self.unknown);
        w.write_f32(self.fps);

        debug_assert_eq!(w.position(), RECORD_SIZE);
        buf
    }

    fn decode_slice(buf: &[u8]) -> SensorConfResult<Self> {
        let mut r = FieldReader::new(buf);

        Ok(ConfigurationRecord {
            active_pixel_width: r.read_i16()?,
            active_pixel_height: r.read_i16()?,
            pixel_array_width: r.read_i16()?,
            pixel_array_height: r.read_i16()?,
            sensor_timing: r.read_i32()?,
            output_timing: r.read_i32()?,
            unknown: r.read_bytes()?,
            fps: r.read_f32()?,
        })
    }

    fn decode<R: Read + Seek>(
        reader: &mut R,
        offset: u64,
    ) -> SensorConfResult<Self> {
        let buf: [u8; RECORD_SIZE] = read_region(reader, offset)?;
        Self::decode_slice(&buf)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn changed_fields(
        &self,
        other: &Self,
    ) -> Vec<RecordField> {
        RecordField::ALL
            .iter()
            .copied()
            .filter(|&field| self.get(field) != other.get(field))
            .collect()
    }
}

impl MirroredDimensionsExt for MirroredDimensions {
    fn encode(&self) -> [u8; MIRROR_SIZE] {
        let mut buf = [0u8; MIRROR_SIZE];
        let mut w = FieldWriter::new(&mut buf);

        w.write_i32(self.width);
        w.write_i32(self.height);

        buf
    }

    fn decode_slice(buf: &[u8]) -> SensorConfResult<Self> {
        let mut r = FieldReader::new(buf);

        Ok(MirroredDimensions {
            width: r.read_i32()?,
            height: r.read_i32()?,
        })
    }

    fn decode<R: Read + Seek>(
        reader: &mut R,
        offset: u64,
    ) -> SensorConfResult<Self> {
        let buf: [u8; MIRROR_SIZE] = read_region(reader, offset)?;
        Self::decode_slice(&buf)
    }
}

fn read_region<R: Read + Seek, const N: usize>(
    reader: &mut R,
    offset: u64,
) -> SensorConfResult<[u8; N]> {
    let mut buf = [0u8; N];

    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(&mut buf)?;

    Ok(buf)
}
