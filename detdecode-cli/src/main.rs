use clap::Parser;
use detdecode::{
    CoordSpace, DecodeConfig, Decoder, Detection, Layout, NmsMode, RawTensor, ScoringMode,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode YOLO detection tensors (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for decode stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LayoutConfig {
    PredictionMajor,
    AttributeMajor,
}

impl From<LayoutConfig> for Layout {
    fn from(value: LayoutConfig) -> Self {
        match value {
            LayoutConfig::PredictionMajor => Layout::PredictionMajor,
            LayoutConfig::AttributeMajor => Layout::AttributeMajor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScoringConfig {
    ObjectnessTimesClass,
    ObjectnessOnly,
}

impl From<ScoringConfig> for ScoringMode {
    fn from(value: ScoringConfig) -> Self {
        match value {
            ScoringConfig::ObjectnessTimesClass => ScoringMode::ObjectnessTimesClass,
            ScoringConfig::ObjectnessOnly => ScoringMode::ObjectnessOnly,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NmsConfig {
    ClassAgnostic,
    PerClass,
}

impl From<NmsConfig> for NmsMode {
    fn from(value: NmsConfig) -> Self {
        match value {
            NmsConfig::ClassAgnostic => NmsMode::ClassAgnostic,
            NmsConfig::PerClass => NmsMode::PerClass,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum SpaceConfig {
    Normalized,
    Pixel { width: u32, height: u32 },
}

impl From<SpaceConfig> for CoordSpace {
    fn from(value: SpaceConfig) -> Self {
        match value {
            SpaceConfig::Normalized => CoordSpace::Normalized,
            SpaceConfig::Pixel { width, height } => CoordSpace::Pixel { width, height },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    layout: LayoutConfig,
    num_classes: usize,
    confidence_threshold: f32,
    iou_threshold: f32,
    target_class: Option<usize>,
    output_space: SpaceConfig,
    scoring: ScoringConfig,
    nms: NmsConfig,
    max_detections: Option<usize>,
    parallel: bool,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            layout: LayoutConfig::PredictionMajor,
            num_classes: cfg.num_classes,
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            target_class: cfg.target_class,
            output_space: SpaceConfig::Normalized,
            scoring: ScoringConfig::ObjectnessTimesClass,
            nms: NmsConfig::ClassAgnostic,
            max_detections: cfg.max_detections,
            parallel: cfg.parallel,
        }
    }
}

impl From<DecodeConfigJson> for DecodeConfig {
    fn from(value: DecodeConfigJson) -> Self {
        DecodeConfig {
            layout: value.layout.into(),
            num_classes: value.num_classes,
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            target_class: value.target_class,
            output_space: value.output_space.into(),
            scoring: value.scoring.into(),
            nms: value.nms.into(),
            max_detections: value.max_detections,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    output_path: Option<String>,
    decode: DecodeConfigJson,
}

/// Tensor dump as written by an inference engine wrapper.
#[derive(Debug, Deserialize)]
struct TensorFile {
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    class_id: usize,
    confidence: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        let (x1, y1, x2, y2) = value.bbox().corners();
        Self {
            class_id: value.class_id(),
            confidence: value.confidence(),
            x1,
            y1,
            x2,
            y2,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    space: SpaceConfig,
    count: usize,
    detections: Vec<DetectionRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detdecode=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let tensor_text = fs::read_to_string(&config.tensor_path)?;
    let tensor_file: TensorFile = serde_json::from_str(&tensor_text)?;
    let tensor = RawTensor::from_shape(tensor_file.data, &tensor_file.shape)?;

    let space = config.decode.output_space;
    let decoder = Decoder::new(config.decode.into())?;
    let detections = decoder.decode(tensor.view())?;
    tracing::info!(count = detections.len(), "decoded tensor");

    let output = Output {
        space,
        count: detections.len(),
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
