use serde::{Deserialize, Serialize};

/// Именованное поле записи конфигурации (порядок = порядок на диске).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    /// Активная ширина сенсора, пикселей
    ActivePixelWidth,
    /// Активная высота сенсора, пикселей
    ActivePixelHeight,
    /// Полная ширина матрицы
    PixelArrayWidth,
    /// Полная высота матрицы
    PixelArrayHeight,
    /// Внутренний тайминг сенсора
    SensorTiming,
    /// Тайминг выходного интерфейса
    OutputTiming,
    /// Целевая частота кадров
    Fps,
}

/// Тип значения поля на диске.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// i16 little-endian
    Dimension,
    /// i32 little-endian
    Timing,
    /// f32 IEEE 754 little-endian
    Rate,
}

/// Значение поля, прочитанное из записи.
///
/// Сравнение `Float` идёт по битовому представлению, чтобы NaN из
/// прошивки не ломал проверку "поле не изменилось".
#[derive(Debug, Clone, Copy)]
pub enum FieldValue {
    Int(i32),
    Float(f32),
}

impl RecordField {
    /// Все поля в порядке таблицы.
    pub const ALL: [RecordField; 7] = [
        RecordField::ActivePixelWidth,
        RecordField::ActivePixelHeight,
        RecordField::PixelArrayWidth,
        RecordField::PixelArrayHeight,
        RecordField::SensorTiming,
        RecordField::OutputTiming,
        RecordField::Fps,
    ];

    /// Имя поля в выводе записи (`active_pixel_width`).
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::ActivePixelWidth => "active_pixel_width",
            RecordField::ActivePixelHeight => "active_pixel_height",
            RecordField::PixelArrayWidth => "pixel_array_width",
            RecordField::PixelArrayHeight => "pixel_array_height",
            RecordField::SensorTiming => "sensor_timing",
            RecordField::OutputTiming => "output_timing",
            RecordField::Fps => "fps",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            RecordField::ActivePixelWidth
            | RecordField::ActivePixelHeight
            | RecordField::PixelArrayWidth
            | RecordField::PixelArrayHeight => FieldKind::Dimension,
            RecordField::SensorTiming | RecordField::OutputTiming => FieldKind::Timing,
            RecordField::Fps => FieldKind::Rate,
        }
    }
}

impl FieldKind {
    /// Размер значения на диске в байтах
    pub fn size(&self) -> usize {
        match self {
            FieldKind::Dimension => 2,
            FieldKind::Timing => 4,
            FieldKind::Rate => 4,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для RecordField, FieldValue
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for RecordField {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for FieldValue {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl std::fmt::Display for FieldValue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
