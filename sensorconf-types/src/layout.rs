//! Раскладка прошивки: где внутри файла лежат зеркало и запись.
//!
//! Смещения привязаны к конкретной сборке прошивки. Встроенная раскладка
//! описывает `libmmcamera_imx179` из Android 6.0 MRA58K; для других сборок
//! раскладка загружается из JSON.

use std::ops::Range;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{SensorConfError, SensorConfResult, MIRROR_SIZE, RECORD_SIZE};

/// Смещение зеркала ширины/высоты в `libmmcamera_imx179` (MRA58K)
pub const IMX179_MRA58K_MIRROR_OFFSET: u64 = 0x431C;

/// Смещение записи конфигурации в `libmmcamera_imx179` (MRA58K)
pub const IMX179_MRA58K_CONFIG_OFFSET: u64 = 0x4404;

/// Дескриптор раскладки одной сборки прошивки.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareLayout {
    /// Человекочитаемое имя сборки
    pub name: String,
    /// Смещение двух i32 (ширина, высота)
    #[serde(deserialize_with = "deserialize_offset")]
    pub mirror_offset: u64,
    /// Смещение 28-байтной записи
    #[serde(deserialize_with = "deserialize_offset")]
    pub config_offset: u64,
}

impl FirmwareLayout {
    pub fn new<S: Into<String>>(
        name: S,
        mirror_offset: u64,
        config_offset: u64,
    ) -> Self {
        Self {
            name: name.into(),
            mirror_offset,
            config_offset,
        }
    }

    /// Встроенная раскладка `imx179-mra58k`.
    pub fn imx179_mra58k() -> Self {
        Self::new(
            "imx179-mra58k",
            IMX179_MRA58K_MIRROR_OFFSET,
            IMX179_MRA58K_CONFIG_OFFSET,
        )
    }

    /// Байтовый диапазон зеркала.
    pub fn mirror_range(&self) -> SensorConfResult<Range<u64>> {
        region(self.mirror_offset, MIRROR_SIZE, "mirror")
    }

    /// Байтовый диапазон записи.
    pub fn config_range(&self) -> SensorConfResult<Range<u64>> {
        region(self.config_offset, RECORD_SIZE, "record")
    }

    /// Проверяет, что регионы не переполняют u64 и не пересекаются.
    pub fn validate(&self) -> SensorConfResult<()> {
        let mirror = self.mirror_range()?;
        let config = self.config_range()?;

        if mirror.start < config.end && config.start < mirror.end {
            return Err(SensorConfError::invalid_layout(format!(
                "{}: mirror {:#x}..{:#x} overlaps record {:#x}..{:#x}",
                self.name, mirror.start, mirror.end, config.start, config.end
            )));
        }

        Ok(())
    }

    /// Минимальная длина файла, вмещающая оба региона.
    pub fn required_len(&self) -> SensorConfResult<u64> {
        Ok(self.mirror_range()?.end.max(self.config_range()?.end))
    }
}

impl Default for FirmwareLayout {
    fn default() -> Self {
        Self::imx179_mra58k()
    }
}

impl std::fmt::Display for FirmwareLayout {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{} (mirror @ {:#x}, record @ {:#x})",
            self.name, self.mirror_offset, self.config_offset
        )
    }
}

fn region(
    offset: u64,
    size: usize,
    what: &str,
) -> SensorConfResult<Range<u64>> {
    let end = offset.checked_add(size as u64).ok_or_else(|| {
        SensorConfError::invalid_layout(format!("{what} offset {offset:#x} overflows"))
    })?;

    Ok(offset..end)
}

/// Парсит целое число: десятичное или `0x`-шестнадцатеричное, со знаком.
///
/// # Примеры
/// ```
/// use sensorconf_types::parse_int;
/// assert_eq!(parse_int("0x4404").unwrap(), 0x4404);
/// assert_eq!(parse_int("-1232").unwrap(), -1232);
/// assert_eq!(parse_int("1_000").unwrap(), 1000);
/// ```
pub fn parse_int(s: &str) -> Result<i64, String> {
    let trimmed = s.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if body.starts_with(|c: char| c == '+' || c == '-') {
        return Err(format!("Invalid integer '{s}': repeated sign"));
    }
    let digits = body.replace('_', "");

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        // from_str_radix допускает знак, а здесь он уже снят
        if hex.starts_with(|c: char| c == '+' || c == '-') {
            return Err(format!("Invalid integer '{s}': sign after 0x"));
        }
        i128::from_str_radix(hex, 16)
    } else {
        digits.parse::<i128>()
    }
    .map_err(|e| format!("Invalid integer '{s}': {e}"))?;

    let value = if negative { -magnitude } else { magnitude };

    i64::try_from(value).map_err(|_| format!("Integer '{s}' does not fit in 64 bits"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OffsetRepr {
    Number(u64),
    Text(String),
}

fn deserialize_offset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match OffsetRepr::deserialize(deserializer)? {
        OffsetRepr::Number(n) => Ok(n),
        OffsetRepr::Text(s) => {
            let value = parse_int(&s).map_err(serde::de::Error::custom)?;
            u64::try_from(value)
                .map_err(|_| serde::de::Error::custom(format!("offset '{s}' is negative")))
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
