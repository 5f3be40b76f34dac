use std::path::PathBuf;

use sensorconf_types::{ConfigurationRecord, FirmwareLayout, MirroredDimensions, RecordField};
use serde::Serialize;

/// Итог одного запуска: что прочитано и (если была запись) что записано.
#[derive(Debug, Clone, Serialize)]
pub struct PatchReport {
    pub input_path: PathBuf,
    pub source_len: u64,
    pub layout: FirmwareLayout,
    /// Запись, прочитанная из исходного файла
    pub record: ConfigurationRecord,
    /// Зеркало, прочитанное из исходного файла
    pub mirror: MirroredDimensions,
    pub mirror_in_sync: bool,
    /// None в режиме только чтения
    pub commit: Option<CommitReport>,
}

/// Сведения о записанном файле.
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub output_path: PathBuf,
    pub record: ConfigurationRecord,
    pub mirror: MirroredDimensions,
    /// Изменённые поля в порядке таблицы
    pub changed_fields: Vec<RecordField>,
    pub bytes_copied: u64,
}

impl PatchReport {
    pub fn is_read_only(&self) -> bool {
        self.commit.is_none()
    }
}

impl std::fmt::Display for PatchReport {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "  Input         : {} ({} bytes)",
            self.input_path.display(),
            self.source_len
        )?;
        writeln!(f, "  Layout        : {}", self.layout)?;
        writeln!(f, "  Record        : {}", self.record)?;
        writeln!(
            f,
            "  Mirror        : {} ({})",
            self.mirror,
            if self.mirror_in_sync { "in sync" } else { "OUT OF SYNC" }
        )?;

        match &self.commit {
            None => writeln!(f, "  Output        : none (read-only)")?,
            Some(c) => {
                let changed: Vec<&str> = c.changed_fields.iter().map(|field| field.name()).collect();
                writeln!(f, "  Output        : {}", c.output_path.display())?;
                writeln!(f, "  New record    : {}", c.record)?;
                writeln!(f, "  New mirror    : {}", c.mirror)?;
                writeln!(
                    f,
                    "  Changed       : {}",
                    if changed.is_empty() { "nothing".to_string() } else { changed.join(", ") }
                )?;
                writeln!(f, "  Bytes copied  : {}", c.bytes_copied)?;
            }
        }

        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
