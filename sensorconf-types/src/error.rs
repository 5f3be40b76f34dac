use thiserror::Error;

use crate::RecordField;

/// Результат для операций sensorconf
pub type SensorConfResult<T> = std::result::Result<T, SensorConfError>;

/// Типы ошибок чтения и правки записи конфигурации.
#[derive(Debug, Error)]
pub enum SensorConfError {
    /// Ошибки ввода/вывода, включая усечённое чтение записи
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Файл слишком короткий для регионов раскладки
    #[error("Corrupt input: {0}")]
    CorruptInput(String),

    /// Значение переопределения вне диапазона поля или неверного типа
    #[error("Invalid override for {field}: {value} ({reason})")]
    InvalidOverride {
        field: RecordField,
        value: String,
        reason: String,
    },

    /// Некорректная раскладка прошивки (пересечение регионов, переполнение)
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

impl SensorConfError {
    /// Удобные конструкторы
    pub fn corrupt_input<S: Into<String>>(s: S) -> Self {
        Self::CorruptInput(s.into())
    }

    pub fn invalid_layout<S: Into<String>>(s: S) -> Self {
        Self::InvalidLayout(s.into())
    }

    pub fn invalid_override<V: std::fmt::Display, S: Into<String>>(
        field: RecordField,
        value: V,
        reason: S,
    ) -> Self {
        Self::InvalidOverride {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
