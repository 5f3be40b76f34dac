use serde::{Serialize, Serializer};

use crate::{FieldValue, RecordField};

/// Размер записи конфигурации на диске (28 байт)
pub const RECORD_SIZE: usize = 28;

/// Размер непрозрачной области внутри записи
pub const UNKNOWN_SIZE: usize = 8;

/// Запись конфигурации сенсора (фиксированный размер 28 байт, little-endian).
///
/// Равенство записей побитовое: `fps` сравнивается по `to_bits()`, поэтому
/// запись, прочитанная и записанная обратно, всегда равна самой себе.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfigurationRecord {
    /// Активная ширина сенсора, пикселей
    pub active_pixel_width: i16,
    /// Активная высота сенсора, пикселей
    pub active_pixel_height: i16,
    /// Полная ширина матрицы
    pub pixel_array_width: i16,
    /// Полная высота матрицы
    pub pixel_array_height: i16,
    /// Внутренний тайминг сенсора
    pub sensor_timing: i32,
    /// Тайминг выходного интерфейса
    pub output_timing: i32,
    /// Непрозрачные байты, не интерпретируются и сохраняются как есть
    #[serde(serialize_with = "serialize_hex")]
    pub unknown: [u8; UNKNOWN_SIZE],
    /// Целевая частота кадров
    pub fps: f32,
}

impl ConfigurationRecord {
    /// Значение именованного поля.
    pub fn get(
        &self,
        field: RecordField,
    ) -> FieldValue {
        match field {
            RecordField::ActivePixelWidth => FieldValue::Int(self.active_pixel_width.into()),
            RecordField::ActivePixelHeight => FieldValue::Int(self.active_pixel_height.into()),
            RecordField::PixelArrayWidth => FieldValue::Int(self.pixel_array_width.into()),
            RecordField::PixelArrayHeight => FieldValue::Int(self.pixel_array_height.into()),
            RecordField::SensorTiming => FieldValue::Int(self.sensor_timing),
            RecordField::OutputTiming => FieldValue::Int(self.output_timing),
            RecordField::Fps => FieldValue::Float(self.fps),
        }
    }
}

impl PartialEq for ConfigurationRecord {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        RecordField::ALL
            .iter()
            .all(|&field| self.get(field) == other.get(field))
            && self.unknown == other.unknown
    }
}

impl Eq for ConfigurationRecord {}

/// Однострочный вывод `field=value` всех именованных полей (без `unknown`).
impl std::fmt::Display for ConfigurationRecord {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        for (i, field) in RecordField::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", field.name(), self.get(*field))?;
        }

        Ok(())
    }
}

fn serialize_hex<S: Serializer>(
    bytes: &[u8; UNKNOWN_SIZE],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    serializer.serialize_str(&hex)
}
