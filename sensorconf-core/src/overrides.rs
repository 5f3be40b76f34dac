use std::collections::BTreeMap;

use sensorconf_types::{
    ConfigurationRecord, FieldKind, RecordField, SensorConfError, SensorConfResult,
};

/// Значение переопределения до проверки диапазона поля.
///
/// Хранится в широком типе, чтобы выход за диапазон (например, ширина
/// 40000) обнаруживался на границе, а не обрезался молча при парсинге.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideValue {
    Int(i64),
    Float(f64),
}

/// Разреженный набор переопределений полей записи.
///
/// Отсутствующее поле не меняется (не обнуляется).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOverrideSet {
    values: BTreeMap<RecordField, OverrideValue>,
}

impl FieldOverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Задаёт значение поля. Повторный вызов заменяет предыдущее значение.
    pub fn set<V: Into<OverrideValue>>(
        &mut self,
        field: RecordField,
        value: V,
    ) -> &mut Self {
        self.values.insert(field, value.into());
        self
    }

    /// Builder-вариант [`set`](Self::set).
    pub fn with<V: Into<OverrideValue>>(
        mut self,
        field: RecordField,
        value: V,
    ) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(
        &self,
        field: RecordField,
    ) -> Option<OverrideValue> {
        self.values.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Пары (поле, значение) в порядке таблицы.
    pub fn iter(&self) -> impl Iterator<Item = (RecordField, OverrideValue)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }

    /// Добавляет значения из `other`; при совпадении полей побеждает `other`.
    pub fn merge(
        &mut self,
        other: &FieldOverrideSet,
    ) {
        for (field, value) in other.iter() {
            self.values.insert(field, value);
        }
    }

    /// Пресет удвоения частоты кадров.
    ///
    /// Делит пополам `active_pixel_width`, `active_pixel_height`,
    /// `pixel_array_height` и `output_timing`, удваивает `fps`.
    pub fn double_frame_rate(record: &ConfigurationRecord) -> Self {
        FieldOverrideSet::new()
            .with(RecordField::ActivePixelWidth, record.active_pixel_width / 2)
            .with(RecordField::ActivePixelHeight, record.active_pixel_height / 2)
            .with(RecordField::PixelArrayHeight, record.pixel_array_height / 2)
            .with(RecordField::OutputTiming, record.output_timing / 2)
            .with(RecordField::Fps, f64::from(record.fps) * 2.0)
    }
}

/// Возвращает новую запись с применёнными переопределениями.
///
/// Исходная запись не меняется. Все значения проверяются до построения
/// результата: первая же ошибка возвращается как `InvalidOverride`.
pub fn with_overrides(
    record: &ConfigurationRecord,
    overrides: &FieldOverrideSet,
) -> SensorConfResult<ConfigurationRecord> {
    let mut out = *record;

    for (field, value) in overrides.iter() {
        match field {
            RecordField::ActivePixelWidth => out.active_pixel_width = checked_int(field, value)?,
            RecordField::ActivePixelHeight => out.active_pixel_height = checked_int(field, value)?,
            RecordField::PixelArrayWidth => out.pixel_array_width = checked_int(field, value)?,
            RecordField::PixelArrayHeight => out.pixel_array_height = checked_int(field, value)?,
            RecordField::SensorTiming => out.sensor_timing = checked_int(field, value)?,
            RecordField::OutputTiming => out.output_timing = checked_int(field, value)?,
            RecordField::Fps => out.fps = checked_rate(field, value)?,
        }
    }

    Ok(out)
}

fn checked_int<T: TryFrom<i64>>(
    field: RecordField,
    value: OverrideValue,
) -> SensorConfResult<T> {
    let (min, max) = match field.kind() {
        FieldKind::Dimension => (i64::from(i16::MIN), i64::from(i16::MAX)),
        _ => (i64::from(i32::MIN), i64::from(i32::MAX)),
    };

    match value {
        OverrideValue::Int(v) => T::try_from(v).map_err(|_| {
            SensorConfError::invalid_override(field, v, format!("out of range {min}..={max}"))
        }),
        OverrideValue::Float(v) => Err(SensorConfError::invalid_override(
            field,
            v,
            "expected an integer",
        )),
    }
}

fn checked_rate(
    field: RecordField,
    value: OverrideValue,
) -> SensorConfResult<f32> {
    let v = match value {
        OverrideValue::Int(v) => v as f64,
        OverrideValue::Float(v) => v,
    };

    if !v.is_finite() {
        return Err(SensorConfError::invalid_override(
            field,
            v,
            "must be a finite number",
        ));
    }

    if v.abs() > f64::from(f32::MAX) {
        return Err(SensorConfError::invalid_override(
            field,
            v,
            "out of 32-bit float range",
        ));
    }

    Ok(v as f32)
}

////////////////////////////////////////////////////////////////////////////////
// Преобразования в OverrideValue
////////////////////////////////////////////////////////////////////////////////

impl From<i64> for OverrideValue {
    fn from(v: i64) -> Self {
        OverrideValue::Int(v)
    }
}

impl From<i32> for OverrideValue {
    fn from(v: i32) -> Self {
        OverrideValue::Int(v.into())
    }
}

impl From<i16> for OverrideValue {
    fn from(v: i16) -> Self {
        OverrideValue::Int(v.into())
    }
}

impl From<f64> for OverrideValue {
    fn from(v: f64) -> Self {
        OverrideValue::Float(v)
    }
}

impl From<f32> for OverrideValue {
    fn from(v: f32) -> Self {
        OverrideValue::Float(v.into())
    }
}

impl std::fmt::Display for OverrideValue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            OverrideValue::Int(v) => write!(f, "{v}"),
            OverrideValue::Float(v) => write!(f, "{v}"),
        }
    }
}
