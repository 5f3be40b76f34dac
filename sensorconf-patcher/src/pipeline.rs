//! Конвейер правки: Opened → Decoded → (Transformed) → Committed.
//!
//! Каждая стадия является отдельным типом, который потребляет предыдущую, поэтому
//! запись в файл невозможна без прочитанной и преобразованной записи.

use std::{
    fs::File,
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use sensorconf_core::{
    with_overrides, ConfigurationRecordExt, FieldOverrideSet, MirroredDimensionsExt,
};
use sensorconf_types::{ConfigurationRecord, FirmwareLayout, MirroredDimensions, SensorConfError};

use crate::{CommitReport, PatchConfig, PatchError, PatchReport, PatchResult};

/// Оркестрирует один запуск правки.
pub struct PatchPipeline {
    config: PatchConfig,
}

impl PatchPipeline {
    /// Создаёт конвейер, проверяя раскладку.
    pub fn new(config: PatchConfig) -> PatchResult<Self> {
        config.layout.validate()?;

        Ok(Self { config })
    }

    /// Выполняет все стадии. Без выходного пути останавливается после
    /// чтения записи и ничего не создаёт.
    pub fn run(self) -> PatchResult<PatchReport> {
        let cfg = &self.config;

        let decoded = Opened::open(&cfg.input_path)?.decode(&cfg.layout)?;
        debug!("{}: {}", cfg.input_path.display(), decoded.record());

        let mut report = decoded.report();

        let Some(output_path) = cfg.output_path.as_deref() else {
            if cfg.has_changes() {
                warn!("Overrides ignored: no output file given (read-only run)");
            }
            return Ok(report);
        };

        let overrides = cfg.effective_overrides(decoded.record());
        let committed = decoded.transform(&overrides)?.commit(output_path)?;
        debug!("{}: {}", output_path.display(), committed.record());

        report.commit = Some(committed.into_report());
        Ok(report)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Стадии
////////////////////////////////////////////////////////////////////////////////

/// Исходный файл открыт на чтение.
pub struct Opened {
    path: PathBuf,
    file: File,
    len: u64,
}

/// Запись и зеркало прочитаны из исходного файла.
pub struct Decoded {
    source: Opened,
    layout: FirmwareLayout,
    record: ConfigurationRecord,
    mirror: MirroredDimensions,
}

/// Новая запись построена, в файлы ещё ничего не записано.
pub struct Transformed {
    decoded: Decoded,
    record: ConfigurationRecord,
}

/// Выходной файл записан и переименован на место.
pub struct Committed {
    output_path: PathBuf,
    original: ConfigurationRecord,
    record: ConfigurationRecord,
    mirror: MirroredDimensions,
    bytes_copied: u64,
}

impl Opened {
    pub fn open<P: AsRef<Path>>(path: P) -> PatchResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(PatchError::at(path))?;
        let len = file.metadata().map_err(PatchError::at(path))?.len();

        debug!("Opened {} ({len} bytes)", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
        })
    }

    /// Читает запись и зеркало по смещениям раскладки.
    ///
    /// Файл короче, чем нужно обоим регионам: `CorruptInput`.
    pub fn decode(
        mut self,
        layout: &FirmwareLayout,
    ) -> PatchResult<Decoded> {
        layout.validate()?;

        let required = layout.required_len()?;
        if self.len < required {
            return Err(SensorConfError::corrupt_input(format!(
                "{} is {} bytes, layout {} needs at least {required}",
                self.path.display(),
                self.len,
                layout.name
            ))
            .into());
        }

        let record = ConfigurationRecord::decode(&mut self.file, layout.config_offset)?;
        let mirror = MirroredDimensions::decode(&mut self.file, layout.mirror_offset)?;

        if !mirror.is_in_sync_with(&record) {
            warn!(
                "{}: mirror {mirror} does not match record {}x{}",
                self.path.display(),
                record.active_pixel_width,
                record.active_pixel_height
            );
        }

        Ok(Decoded {
            source: self,
            layout: layout.clone(),
            record,
            mirror,
        })
    }
}

impl Decoded {
    pub fn record(&self) -> &ConfigurationRecord {
        &self.record
    }

    /// Отчёт режима только чтения.
    pub fn report(&self) -> PatchReport {
        PatchReport {
            input_path: self.source.path.clone(),
            source_len: self.source.len,
            layout: self.layout.clone(),
            record: self.record,
            mirror: self.mirror,
            mirror_in_sync: self.mirror.is_in_sync_with(&self.record),
            commit: None,
        }
    }

    /// Применяет переопределения. Ошибка диапазона возвращается до любой
    /// записи на диск.
    pub fn transform(
        self,
        overrides: &FieldOverrideSet,
    ) -> PatchResult<Transformed> {
        let record = with_overrides(&self.record, overrides)?;

        for field in self.record.changed_fields(&record) {
            debug!(
                "{field}: {} -> {}",
                self.record.get(field),
                record.get(field)
            );
        }

        Ok(Transformed {
            decoded: self,
            record,
        })
    }
}

impl Transformed {
    /// Копирует исходный файл во временный рядом с `output_path`, пишет
    /// зеркало и запись, затем атомарно переименовывает его на место.
    ///
    /// При любой ошибке временный файл удаляется, существующий
    /// `output_path` остаётся нетронутым. `output_path` может совпадать с
    /// исходным путём. Символическая ссылка в `output_path` разрешается:
    /// правится файл, на который она указывает, сама ссылка остаётся.
    pub fn commit<P: AsRef<Path>>(
        self,
        output_path: P,
    ) -> PatchResult<Committed> {
        let output_path = output_path.as_ref();
        let Transformed { decoded, record } = self;
        let Decoded {
            source,
            layout,
            record: original,
            ..
        } = decoded;
        let Opened {
            path: source_path,
            mut file,
            len,
        } = source;

        let target = resolve_output(output_path).map_err(PatchError::at(output_path))?;
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".sensorconf-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(PatchError::at(output_path))?;

        // (a) Полная побайтовая копия исходника
        file.seek(SeekFrom::Start(0))
            .map_err(PatchError::at(&source_path))?;
        let bytes_copied =
            std::io::copy(&mut file, tmp.as_file_mut()).map_err(PatchError::at(tmp.path()))?;
        let permissions = file
            .metadata()
            .map_err(PatchError::at(&source_path))?
            .permissions();
        drop(file);

        if bytes_copied != len {
            return Err(PatchError::io(
                &source_path,
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("copied {bytes_copied} of {len} bytes"),
                ),
            ));
        }

        // (b) Зеркало, (c) запись
        let mirror = MirroredDimensions::from_record(&record);
        let out = tmp.as_file_mut();
        write_at(out, layout.mirror_offset, &mirror.encode()).map_err(PatchError::at(output_path))?;
        write_at(out, layout.config_offset, &record.encode()).map_err(PatchError::at(output_path))?;

        out.set_permissions(permissions)
            .map_err(PatchError::at(output_path))?;
        out.sync_all().map_err(PatchError::at(output_path))?;

        tmp.persist(&target)
            .map_err(|e| PatchError::io(output_path, e.error))?;

        debug!(
            "Committed {} -> {} ({bytes_copied} bytes, mirror @ {:#x}, record @ {:#x})",
            source_path.display(),
            target.display(),
            layout.mirror_offset,
            layout.config_offset
        );

        Ok(Committed {
            output_path: output_path.to_path_buf(),
            original,
            record,
            mirror,
            bytes_copied,
        })
    }
}

impl Committed {
    pub fn record(&self) -> &ConfigurationRecord {
        &self.record
    }

    pub fn into_report(self) -> CommitReport {
        CommitReport {
            changed_fields: self.original.changed_fields(&self.record),
            output_path: self.output_path,
            record: self.record,
            mirror: self.mirror,
            bytes_copied: self.bytes_copied,
        }
    }
}

/// Существующий путь разрешается до настоящего файла, новый берётся как есть.
fn resolve_output(path: &Path) -> std::io::Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}

fn write_at(
    file: &mut File,
    offset: u64,
    bytes: &[u8],
) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(bytes)
}
