//! Пример: чтение записи конфигурации и зеркала из файла прошивки
//!
//! Демонстрирует:
//! - чтение записи по смещению встроенной раскладки
//! - проверку согласованности зеркала
//! - построение новой записи через пресет удвоения fps (без записи на диск)

use std::fs::File;

use sensorconf_core::{
    with_overrides, ConfigurationRecordExt, FieldOverrideSet, MirroredDimensionsExt,
};
use sensorconf_types::{ConfigurationRecord, FirmwareLayout, MirroredDimensions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "libmmcamera_imx179.so".to_string());
    let layout = FirmwareLayout::default();

    let mut file = File::open(&input_path)?;
    let record = ConfigurationRecord::decode(&mut file, layout.config_offset)?;
    let mirror = MirroredDimensions::decode(&mut file, layout.mirror_offset)?;

    println!("✓ Record read ({layout})");
    println!("  {}", record.render());
    println!(
        "  Mirror        : {mirror} ({})",
        if mirror.is_in_sync_with(&record) { "✓ in sync" } else { "✗ out of sync" }
    );

    let doubled = with_overrides(&record, &FieldOverrideSet::double_frame_rate(&record))?;
    println!("\nWith --double-fps:");
    println!("  {}", doubled.render());

    for field in record.changed_fields(&doubled) {
        println!(
            "  {:<20}: {} -> {}",
            field.name(),
            record.get(field),
            doubled.get(field)
        );
    }

    Ok(())
}
