use std::path::{Path, PathBuf};

use sensorconf_core::FieldOverrideSet;
use sensorconf_types::{ConfigurationRecord, FirmwareLayout, SensorConfError};

use crate::{PatchError, PatchResult};

pub use sensorconf_types::parse_int;

/// Полная конфигурация одного запуска.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Исходный файл прошивки
    pub input_path: PathBuf,
    /// Выходной файл (None = только чтение и вывод записи)
    pub output_path: Option<PathBuf>,
    /// Явные переопределения полей
    pub overrides: FieldOverrideSet,
    /// Применить пресет удвоения частоты кадров перед явными переопределениями
    pub double_frame_rate: bool,
    /// Смещения зеркала и записи
    pub layout: FirmwareLayout,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl PatchConfig {
    pub fn new<P: Into<PathBuf>>(input_path: P) -> Self {
        Self {
            input_path: input_path.into(),
            ..Self::default()
        }
    }

    /// Есть ли хоть одно запрошенное изменение.
    pub fn has_changes(&self) -> bool {
        self.double_frame_rate || !self.overrides.is_empty()
    }

    /// Итоговый набор переопределений для записи `record`.
    ///
    /// Явные значения побеждают значения пресета.
    pub fn effective_overrides(
        &self,
        record: &ConfigurationRecord,
    ) -> FieldOverrideSet {
        if !self.double_frame_rate {
            return self.overrides.clone();
        }

        let mut set = FieldOverrideSet::double_frame_rate(record);
        set.merge(&self.overrides);
        set
    }
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("libmmcamera_imx179.so"),
            output_path: None,
            overrides: FieldOverrideSet::new(),
            double_frame_rate: false,
            layout: FirmwareLayout::default(),
        }
    }
}

/// Загружает и проверяет раскладку прошивки из JSON.
///
/// ```json
/// { "name": "imx179-mra58k", "mirror_offset": "0x431C", "config_offset": "0x4404" }
/// ```
pub fn load_layout(path: &Path) -> PatchResult<FirmwareLayout> {
    let text = std::fs::read_to_string(path).map_err(PatchError::at(path))?;

    let layout: FirmwareLayout = serde_json::from_str(&text).map_err(|e| {
        SensorConfError::invalid_layout(format!("{}: {e}", path.display()))
    })?;

    layout.validate()?;

    Ok(layout)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
