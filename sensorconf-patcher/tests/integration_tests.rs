use std::{
    path::{Path, PathBuf},
    process::Command,
};

use sensorconf_core::{ConfigurationRecordExt, FieldOverrideSet, MirroredDimensionsExt};
use sensorconf_patcher::{PatchConfig, PatchError, PatchPipeline};
use sensorconf_types::{
    ConfigurationRecord, FirmwareLayout, MirroredDimensions, RecordField, SensorConfError,
    IMX179_MRA58K_CONFIG_OFFSET, IMX179_MRA58K_MIRROR_OFFSET, MIRROR_SIZE, RECORD_SIZE,
};
use tempfile::TempDir;

const MIRROR: usize = IMX179_MRA58K_MIRROR_OFFSET as usize;
const CONFIG: usize = IMX179_MRA58K_CONFIG_OFFSET as usize;

// ===========================================================================
// Helpers: образ прошивки MRA58K
// ===========================================================================

fn reference_record() -> ConfigurationRecord {
    ConfigurationRecord {
        active_pixel_width: 3280,
        active_pixel_height: 2464,
        pixel_array_width: 3448,
        pixel_array_height: 2504,
        sensor_timing: 264_000_000,
        output_timing: 268_800_000,
        unknown: [0xC0, 0xFF, 0xEE, 0x00, 0x11, 0x22, 0x33, 0x44],
        fps: 30.0,
    }
}

/// Пилообразный фон + зеркало + запись + второй (неиспользуемый) экземпляр
/// записи сразу за первым, как в оригинальной прошивке.
fn firmware_bytes() -> Vec<u8> {
    let len = CONFIG + 2 * RECORD_SIZE + 0x200;
    let mut raw: Vec<u8> = (0..len).map(|i| (i * 7 % 253) as u8).collect();
    let record = reference_record();

    raw[MIRROR..MIRROR + MIRROR_SIZE]
        .copy_from_slice(&MirroredDimensions::from_record(&record).encode());
    raw[CONFIG..CONFIG + RECORD_SIZE].copy_from_slice(&record.encode());
    raw[CONFIG + RECORD_SIZE..CONFIG + 2 * RECORD_SIZE].copy_from_slice(&record.encode());
    raw
}

fn write_firmware(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("libmmcamera_imx179.so");
    std::fs::write(&path, firmware_bytes()).unwrap();
    path
}

fn patch(
    input: &Path,
    output: &Path,
    overrides: FieldOverrideSet,
) -> Result<sensorconf_patcher::PatchReport, PatchError> {
    let mut config = PatchConfig::new(input);
    config.output_path = Some(output.to_path_buf());
    config.overrides = overrides;
    PatchPipeline::new(config)?.run()
}

fn assert_preserved_outside_regions(
    source: &[u8],
    dest: &[u8],
) {
    assert_eq!(source.len(), dest.len(), "length must be preserved");

    let mirror = MIRROR..MIRROR + MIRROR_SIZE;
    let config = CONFIG..CONFIG + RECORD_SIZE;

    for (i, (a, b)) in source.iter().zip(dest).enumerate() {
        if !mirror.contains(&i) && !config.contains(&i) {
            assert_eq!(a, b, "byte {i:#x} changed outside patched regions");
        }
    }
}

// ===========================================================================
// Сквозной пример: --fps 60 --active-pixel-height 1232 -o out.bin
// ===========================================================================

#[test]
fn test_end_to_end_fps_and_height() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("out.bin");

    let overrides = FieldOverrideSet::new()
        .with(RecordField::Fps, 60.0)
        .with(RecordField::ActivePixelHeight, 1232i64);
    let report = patch(&input, &output, overrides).unwrap();

    let source = std::fs::read(&input).unwrap();
    let dest = std::fs::read(&output).unwrap();
    assert_preserved_outside_regions(&source, &dest);

    // Зеркало: (3280, 1232) как i32 LE
    assert_eq!(
        &dest[MIRROR..MIRROR + 8],
        &[0xD0, 0x0C, 0x00, 0x00, 0xD0, 0x04, 0x00, 0x00]
    );

    let record = ConfigurationRecord::decode_slice(&dest[CONFIG..]).unwrap();
    let expected = ConfigurationRecord {
        active_pixel_height: 1232,
        fps: 60.0,
        ..reference_record()
    };
    assert_eq!(record, expected);

    let commit = report.commit.unwrap();
    assert_eq!(
        commit.changed_fields,
        vec![RecordField::ActivePixelHeight, RecordField::Fps]
    );
    assert_eq!(commit.bytes_copied, source.len() as u64);
}

// ===========================================================================
// Свойства
// ===========================================================================

#[test]
fn test_mirror_follows_record_after_commit() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("out.bin");

    for (w, h) in [(1640i64, 1232i64), (-3, 32_767), (0, -32_768)] {
        let overrides = FieldOverrideSet::new()
            .with(RecordField::ActivePixelWidth, w)
            .with(RecordField::ActivePixelHeight, h);
        patch(&input, &output, overrides).unwrap();

        let dest = std::fs::read(&output).unwrap();
        let mirror = MirroredDimensions::decode_slice(&dest[MIRROR..]).unwrap();
        assert_eq!(i64::from(mirror.width), w);
        assert_eq!(i64::from(mirror.height), h);
    }
}

#[test]
fn test_mirror_rewritten_even_without_dimension_overrides() {
    let dir = TempDir::new().unwrap();
    let mut raw = firmware_bytes();
    // Рассинхронизированное зеркало в исходнике
    raw[MIRROR..MIRROR + 8].copy_from_slice(&[0u8; 8]);
    let input = dir.path().join("desync.so");
    std::fs::write(&input, &raw).unwrap();
    let output = dir.path().join("out.bin");

    let mut config = PatchConfig::new(&input);
    config.output_path = Some(output.clone());
    let report = PatchPipeline::new(config).unwrap().run().unwrap();
    assert!(!report.mirror_in_sync);

    let dest = std::fs::read(&output).unwrap();
    let mirror = MirroredDimensions::decode_slice(&dest[MIRROR..]).unwrap();
    assert_eq!(mirror, MirroredDimensions { width: 3280, height: 2464 });
}

#[test]
fn test_empty_overrides_reproduce_source() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("copy.bin");

    let report = patch(&input, &output, FieldOverrideSet::new()).unwrap();

    assert_eq!(std::fs::read(&input).unwrap(), std::fs::read(&output).unwrap());
    assert!(report.commit.unwrap().changed_fields.is_empty());
}

#[test]
fn test_second_record_instance_untouched() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("out.bin");

    patch(
        &input,
        &output,
        FieldOverrideSet::new().with(RecordField::SensorTiming, 0x0BEE_F000i64),
    )
    .unwrap();

    let dest = std::fs::read(&output).unwrap();
    let second = ConfigurationRecord::decode_slice(&dest[CONFIG + RECORD_SIZE..]).unwrap();
    assert_eq!(second, reference_record());
}

#[test]
fn test_out_of_range_override_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("out.bin");

    let result = patch(
        &input,
        &output,
        FieldOverrideSet::new().with(RecordField::ActivePixelWidth, 40_000i64),
    );

    assert!(matches!(
        result,
        Err(PatchError::SensorConf(SensorConfError::InvalidOverride { .. }))
    ));
    assert!(!output.exists(), "no output file on InvalidOverride");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_truncated_source_is_corrupt_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("short.so");
    std::fs::write(&input, &firmware_bytes()[..CONFIG + RECORD_SIZE - 1]).unwrap();
    let output = dir.path().join("out.bin");

    let result = patch(&input, &output, FieldOverrideSet::new());

    assert!(matches!(
        result,
        Err(PatchError::SensorConf(SensorConfError::CorruptInput(_)))
    ));
    assert!(!output.exists());
}

#[test]
fn test_source_exactly_required_len_is_accepted() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("exact.so");
    std::fs::write(&input, &firmware_bytes()[..CONFIG + RECORD_SIZE]).unwrap();

    let report = PatchPipeline::new(PatchConfig::new(&input))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(report.record, reference_record());
}

#[test]
fn test_same_path_patches_in_place() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let original = std::fs::read(&input).unwrap();

    patch(
        &input,
        &input,
        FieldOverrideSet::new().with(RecordField::Fps, 24.0),
    )
    .unwrap();

    let patched = std::fs::read(&input).unwrap();
    assert_preserved_outside_regions(&original, &patched);
    assert_eq!(
        ConfigurationRecord::decode_slice(&patched[CONFIG..])
            .unwrap()
            .fps,
        24.0
    );
}

#[test]
fn test_invalid_override_leaves_existing_destination() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("out.bin");
    std::fs::write(&output, b"previous contents").unwrap();

    let result = patch(
        &input,
        &output,
        FieldOverrideSet::new().with(RecordField::OutputTiming, i64::MAX),
    );

    assert!(result.is_err());
    assert_eq!(std::fs::read(&output).unwrap(), b"previous contents");
}

#[test]
fn test_failed_commit_leaves_existing_destination() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    // Переименование файла поверх непустого каталога невозможно
    let output = dir.path().join("outdir");
    std::fs::create_dir(&output).unwrap();
    std::fs::write(output.join("keep.txt"), b"previous contents").unwrap();

    let result = patch(
        &input,
        &output,
        FieldOverrideSet::new().with(RecordField::Fps, 60.0),
    );

    assert!(matches!(result, Err(PatchError::Io { .. })));
    assert!(output.is_dir());
    assert_eq!(
        std::fs::read(output.join("keep.txt")).unwrap(),
        b"previous contents"
    );

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["libmmcamera_imx179.so", "outdir"]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_output_patches_link_target() {
    let dir = TempDir::new().unwrap();
    let real = write_firmware(&dir);
    let link = dir.path().join("link.so");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let report = patch(
        &link,
        &link,
        FieldOverrideSet::new().with(RecordField::Fps, 60.0),
    )
    .unwrap();
    assert_eq!(report.commit.unwrap().output_path, link);

    let meta = std::fs::symlink_metadata(&link).unwrap();
    assert!(meta.file_type().is_symlink(), "link must stay a symlink");

    let patched = std::fs::read(&real).unwrap();
    assert_preserved_outside_regions(&firmware_bytes(), &patched);
    assert_eq!(
        ConfigurationRecord::decode_slice(&patched[CONFIG..])
            .unwrap()
            .fps,
        60.0
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_missing_output_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("no-such-dir").join("out.bin");

    let result = patch(&input, &output, FieldOverrideSet::new());
    assert!(matches!(result, Err(PatchError::Io { .. })));
}

#[test]
fn test_double_frame_rate_preset_with_explicit_fps() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let output = dir.path().join("out.bin");

    let mut config = PatchConfig::new(&input);
    config.output_path = Some(output.clone());
    config.double_frame_rate = true;
    config.overrides.set(RecordField::Fps, 59.0);
    PatchPipeline::new(config).unwrap().run().unwrap();

    let dest = std::fs::read(&output).unwrap();
    let record = ConfigurationRecord::decode_slice(&dest[CONFIG..]).unwrap();
    assert_eq!(record.active_pixel_width, 1640);
    assert_eq!(record.active_pixel_height, 1232);
    assert_eq!(record.pixel_array_width, 3448);
    assert_eq!(record.pixel_array_height, 1252);
    assert_eq!(record.output_timing, 134_400_000);
    assert_eq!(record.fps, 59.0);

    let mirror = MirroredDimensions::decode_slice(&dest[MIRROR..]).unwrap();
    assert_eq!(mirror, MirroredDimensions { width: 1640, height: 1232 });
}

#[test]
fn test_custom_layout() {
    let dir = TempDir::new().unwrap();
    let layout = FirmwareLayout::new("tiny", 0x00, 0x10);

    let mut raw = vec![0xA5u8; 0x40];
    raw[0x10..0x10 + RECORD_SIZE].copy_from_slice(&reference_record().encode());
    let input = dir.path().join("tiny.so");
    std::fs::write(&input, &raw).unwrap();
    let output = dir.path().join("tiny-out.so");

    let mut config = PatchConfig::new(&input);
    config.layout = layout;
    config.output_path = Some(output.clone());
    config.overrides.set(RecordField::PixelArrayWidth, 1724i64);
    let report = PatchPipeline::new(config).unwrap().run().unwrap();

    // Зеркало в исходнике: мусор 0xA5
    assert!(!report.mirror_in_sync);

    let dest = std::fs::read(&output).unwrap();
    assert_eq!(
        MirroredDimensions::decode_slice(&dest).unwrap(),
        MirroredDimensions { width: 3280, height: 2464 }
    );
    assert_eq!(
        ConfigurationRecord::decode_slice(&dest[0x10..])
            .unwrap()
            .pixel_array_width,
        1724
    );
    assert_eq!(&dest[0x10 + RECORD_SIZE..], &raw[0x10 + RECORD_SIZE..]);
}

// ===========================================================================
// Командная строка
// ===========================================================================

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sensorconf-patch"))
}

#[test]
fn test_cli_read_only_prints_record() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);

    let output = cli().arg(&input).output().unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("active_pixel_width=3280 active_pixel_height=2464"),
        "stderr: {stderr}"
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_cli_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let out = dir.path().join("out.bin");

    let output = cli()
        .arg(&input)
        .args(["--fps", "60", "--active-pixel-height", "1232", "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("active_pixel_height=1232"));
    assert!(stderr.contains("fps=60"));

    let dest = std::fs::read(&out).unwrap();
    assert_preserved_outside_regions(&firmware_bytes(), &dest);
    assert_eq!(
        MirroredDimensions::decode_slice(&dest[MIRROR..]).unwrap(),
        MirroredDimensions { width: 3280, height: 1232 }
    );
}

#[test]
fn test_cli_out_of_range_fails_with_help() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let out = dir.path().join("out.bin");

    let output = cli()
        .arg(&input)
        .args(["--active-pixel-width", "40000", "-o"])
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!out.exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("active_pixel_width"), "stderr: {stderr}");
    assert!(stderr.contains("Usage"), "help must be printed: {stderr}");
}

#[test]
fn test_cli_missing_input_fails() {
    let output = cli().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no input file given"));
}

#[test]
fn test_cli_hex_and_negative_values_and_json() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let out = dir.path().join("out.bin");

    let output = cli()
        .arg("-i")
        .arg(&input)
        .args(["--sensor-timing", "0x0FBC8E00", "--output-timing", "-1", "--json", "-q", "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["commit"]["record"]["sensor_timing"], 0x0FBC_8E00);
    assert_eq!(report["commit"]["record"]["output_timing"], -1);
    assert_eq!(report["mirror_in_sync"], true);
}

#[test]
fn test_cli_quiet_still_prints_renderings() {
    let dir = TempDir::new().unwrap();
    let input = write_firmware(&dir);
    let out = dir.path().join("out.bin");

    let output = cli()
        .arg(&input)
        .args(["-q", "--fps", "24", "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 2, "stderr: {stderr}");
    assert!(lines[0].ends_with("fps=30"), "stderr: {stderr}");
    assert!(lines[1].starts_with(&format!("{}: ", out.display())));
    assert!(lines[1].ends_with("fps=24"), "stderr: {stderr}");
}
