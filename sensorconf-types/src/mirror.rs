use serde::Serialize;

use crate::ConfigurationRecord;

/// Размер зеркала на диске: два i32 little-endian
pub const MIRROR_SIZE: usize = 8;

/// 32-битная копия активных ширины и высоты, хранящаяся отдельно от записи.
///
/// После любой правки обязана совпадать с `active_pixel_width`/`height`
/// записи, расширенными до i32 со знаком.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MirroredDimensions {
    pub width: i32,
    pub height: i32,
}

impl MirroredDimensions {
    pub fn from_record(record: &ConfigurationRecord) -> Self {
        Self {
            width: i32::from(record.active_pixel_width),
            height: i32::from(record.active_pixel_height),
        }
    }

    /// Совпадает ли зеркало с активными размерами записи.
    pub fn is_in_sync_with(
        &self,
        record: &ConfigurationRecord,
    ) -> bool {
        *self == Self::from_record(record)
    }
}

impl std::fmt::Display for MirroredDimensions {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
