//! Кодек записи конфигурации сенсора
//!
//! Чтение, правка и запись 28-байтной записи конфигурации, встроенной в
//! прошивку драйвера камеры, и её 32-битного зеркала ширины/высоты.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use std::fs::File;
//!
//! use sensorconf_core::{with_overrides, ConfigurationRecordExt, FieldOverrideSet};
//! use sensorconf_types::{ConfigurationRecord, FirmwareLayout, RecordField};
//!
//! let layout = FirmwareLayout::default();
//! let mut file = File::open("libmmcamera_imx179.so")?;
//! let record = ConfigurationRecord::decode(&mut file, layout.config_offset)?;
//!
//! let overrides = FieldOverrideSet::new().with(RecordField::Fps, 60.0);
//! let patched = with_overrides(&record, &overrides)?;
//! println!("{}", patched.render());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod format;
pub mod overrides;

pub use binary::*;
pub use format::*;
pub use overrides::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
