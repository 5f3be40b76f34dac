use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use log::{debug, error, LevelFilter};
use sensorconf_core::FieldOverrideSet;
use sensorconf_patcher::{
    load_layout, parse_int, PatchConfig, PatchError, PatchPipeline, PatchResult,
};
use sensorconf_types::{FirmwareLayout, RecordField};

#[derive(Parser, Debug)]
#[command(
    name = "sensorconf-patch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and patch the sensor configuration record of a camera driver blob",
    long_about = None,
)]
struct Cli {
    /// Исходный файл прошивки (например, libmmcamera_imx179.so)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// То же, что INPUT
    #[arg(short = 'i', long = "input-file", conflicts_with = "input")]
    input_file: Option<PathBuf>,
    /// Выходной файл. Без него запись только выводится
    #[arg(short = 'o', long = "output-file")]
    output_file: Option<PathBuf>,
    /// Активная ширина (i16)
    #[arg(long, value_parser = parse_int, allow_hyphen_values = true)]
    active_pixel_width: Option<i64>,
    /// Активная высота (i16)
    #[arg(long, value_parser = parse_int, allow_hyphen_values = true)]
    active_pixel_height: Option<i64>,
    /// Полная ширина матрицы (i16)
    #[arg(long, value_parser = parse_int, allow_hyphen_values = true)]
    pixel_array_width: Option<i64>,
    /// Полная высота матрицы (i16)
    #[arg(long, value_parser = parse_int, allow_hyphen_values = true)]
    pixel_array_height: Option<i64>,
    /// Тайминг сенсора (i32, десятичный или 0x-hex)
    #[arg(long, value_parser = parse_int, allow_hyphen_values = true)]
    sensor_timing: Option<i64>,
    /// Тайминг выходного интерфейса (i32, десятичный или 0x-hex)
    #[arg(long, value_parser = parse_int, allow_hyphen_values = true)]
    output_timing: Option<i64>,
    /// Частота кадров (f32)
    #[arg(long, allow_hyphen_values = true)]
    fps: Option<f64>,
    /// Удвоить частоту кадров: половина active_pixel_width/height,
    /// pixel_array_height и output_timing, двойной fps. Явные флаги важнее
    #[arg(long)]
    double_fps: bool,
    /// JSON-дескриптор раскладки (по умолчанию imx179-mra58k)
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,
    /// Вывести отчёт в формате JSON на stdout
    #[arg(long)]
    json: bool,
    /// Тихий режим: в лог только ошибки, рендеринг записей остаётся
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    /// Подробный вывод
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> FieldOverrideSet {
        let mut set = FieldOverrideSet::new();

        let ints = [
            (RecordField::ActivePixelWidth, self.active_pixel_width),
            (RecordField::ActivePixelHeight, self.active_pixel_height),
            (RecordField::PixelArrayWidth, self.pixel_array_width),
            (RecordField::PixelArrayHeight, self.pixel_array_height),
            (RecordField::SensorTiming, self.sensor_timing),
            (RecordField::OutputTiming, self.output_timing),
        ];

        for (field, value) in ints {
            if let Some(v) = value {
                set.set(field, v);
            }
        }

        if let Some(fps) = self.fps {
            set.set(RecordField::Fps, fps);
        }

        set
    }

    fn input_path(&self) -> PatchResult<PathBuf> {
        self.input
            .clone()
            .or_else(|| self.input_file.clone())
            .ok_or_else(|| PatchError::Config("no input file given".to_string()))
    }
}

fn run(cli: &Cli) -> PatchResult<()> {
    let layout = match &cli.layout {
        Some(path) => load_layout(path)?,
        None => FirmwareLayout::default(),
    };
    debug!("Layout: {layout}");

    let config = PatchConfig {
        input_path: cli.input_path()?,
        output_path: cli.output_file.clone(),
        overrides: cli.overrides(),
        double_frame_rate: cli.double_fps,
        layout,
    };

    let report = PatchPipeline::new(config)?.run()?;
    debug!("\n{report}");

    // Рендеринг записей печатается и в тихом режиме: -q глушит только лог
    eprintln!("{}: {}", report.input_path.display(), report.record);
    if let Some(commit) = &report.commit {
        eprintln!("{}: {}", commit.output_path.display(), commit.record);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        error!("{e}");
        eprintln!("{}", Cli::command().render_help());
        std::process::exit(1);
    }
}
