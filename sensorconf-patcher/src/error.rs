use std::path::{Path, PathBuf};

use sensorconf_types::SensorConfError;
use thiserror::Error;

pub type PatchResult<T> = std::result::Result<T, PatchError>;

#[derive(Debug, Error)]
pub enum PatchError {
    /// Ошибка открытия, чтения, записи или переименования файла
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Ошибка кодека или раскладки (CorruptInput, InvalidOverride, ...)
    #[error(transparent)]
    SensorConf(#[from] SensorConfError),

    /// Ошибка сериализации отчёта
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Некорректные параметры запуска
    #[error("Config error: {0}")]
    Config(String),
}

impl PatchError {
    pub fn io<P: AsRef<Path>>(
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Замыкание для `map_err`, привязывающее путь к ошибке ввода/вывода.
    pub fn at<P: AsRef<Path>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { path, source }
    }
}
