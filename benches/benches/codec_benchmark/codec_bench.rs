use std::{hint::black_box, io::Cursor};

use criterion::{criterion_group, criterion_main, Criterion};
use sensorconf_core::{with_overrides, ConfigurationRecordExt, FieldOverrideSet};
use sensorconf_types::{ConfigurationRecord, FirmwareLayout, RecordField, RECORD_SIZE};

fn reference_record() -> ConfigurationRecord {
    ConfigurationRecord {
        active_pixel_width: 3280,
        active_pixel_height: 2464,
        pixel_array_width: 3448,
        pixel_array_height: 2504,
        sensor_timing: 264_000_000,
        output_timing: 268_800_000,
        unknown: [0x5A; 8],
        fps: 30.0,
    }
}

fn bench_codec(c: &mut Criterion) {
    let record = reference_record();
    let bytes: [u8; RECORD_SIZE] = record.encode();

    c.bench_function("record_encode", |b| b.iter(|| black_box(&record).encode()));

    c.bench_function("record_decode_slice", |b| {
        b.iter(|| ConfigurationRecord::decode_slice(black_box(&bytes)))
    });

    let layout = FirmwareLayout::default();
    let mut image = vec![0u8; layout.required_len().unwrap_or(0) as usize];
    let off = layout.config_offset as usize;
    image[off..off + RECORD_SIZE].copy_from_slice(&bytes);

    c.bench_function("record_decode_at_offset", |b| {
        b.iter(|| ConfigurationRecord::decode(&mut Cursor::new(&image), layout.config_offset))
    });
}

fn bench_overrides(c: &mut Criterion) {
    let record = reference_record();
    let preset = FieldOverrideSet::double_frame_rate(&record);
    let sparse = FieldOverrideSet::new()
        .with(RecordField::Fps, 60.0)
        .with(RecordField::ActivePixelHeight, 1232i64);

    c.bench_function("with_overrides_sparse", |b| {
        b.iter(|| with_overrides(black_box(&record), black_box(&sparse)))
    });

    c.bench_function("with_overrides_double_fps", |b| {
        b.iter(|| with_overrides(black_box(&record), black_box(&preset)))
    });

    c.bench_function("render", |b| b.iter(|| black_box(&record).render()));
}

criterion_group!(benches, bench_codec, bench_overrides);
criterion_main!(benches);
