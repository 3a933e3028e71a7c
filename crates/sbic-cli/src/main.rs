// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sbic_cli::run_segmentation;
use sbic_core::{
    ExecutionContext, FeatureView, MemoryLayout, ProgressSink, SbicError, SegmentationResult,
    TelemetrySink,
};
use sbic_offline::{CoarseWindow, FineStep, SbicConfig};
use serde::Serialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

struct Cli {
    command: Command,
}

enum Command {
    Segment(SegmentArgs),
}

#[derive(Debug, Default)]
struct SegmentArgs {
    input: PathBuf,
    layout: LayoutArg,
    config: Option<PathBuf>,
    size1: Option<usize>,
    inc1: Option<usize>,
    size2: Option<usize>,
    inc2: Option<usize>,
    cpw: Option<f64>,
    fine_step: Option<FineStep>,
    coarse_window: Option<CoarseWindow>,
    hop_size: Option<usize>,
    sample_rate: Option<f64>,
    output: Option<PathBuf>,
    verbose: bool,
}

/// Orientation of the CSV input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum LayoutArg {
    /// One row per frame, one column per feature.
    #[default]
    Frames,
    /// One row per feature, one column per frame.
    Features,
}

impl LayoutArg {
    fn parse(raw: &str) -> Result<Self, CliError> {
        match raw.to_ascii_lowercase().as_str() {
            "frames" => Ok(Self::Frames),
            "features" => Ok(Self::Features),
            _ => Err(CliError::invalid_input(format!(
                "invalid --layout '{raw}'; expected one of: frames, features"
            ))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Frames => "frames",
            Self::Features => "features",
        }
    }
}

fn parse_fine_step(raw: &str) -> Result<FineStep, CliError> {
    match raw.to_ascii_lowercase().as_str() {
        "coarse" => Ok(FineStep::Coarse),
        "fine" => Ok(FineStep::Fine),
        _ => Err(CliError::invalid_input(format!(
            "invalid --fine-step '{raw}'; expected one of: coarse, fine"
        ))),
    }
}

fn parse_coarse_window(raw: &str) -> Result<CoarseWindow, CliError> {
    match raw.to_ascii_lowercase().as_str() {
        "anchored" => Ok(CoarseWindow::Anchored),
        "sliding" => Ok(CoarseWindow::Sliding),
        _ => Err(CliError::invalid_input(format!(
            "invalid --coarse-window '{raw}'; expected one of: anchored, sliding"
        ))),
    }
}

#[derive(Debug)]
enum CliError {
    Sbic(SbicError),
    Io {
        context: String,
        source: std::io::Error,
    },
    Json {
        context: String,
        source: serde_json::Error,
    },
    InvalidInput(String),
    NotSupported(String),
}

impl CliError {
    fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Sbic(err) => err.code(),
            Self::InvalidInput(_) => "invalid_input",
            Self::NotSupported(_) => "not_supported",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sbic(err) => write!(f, "{err}"),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Json { context, source } => write!(f, "{context}: {source}"),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
            Self::NotSupported(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sbic(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidInput(_) | Self::NotSupported(_) => None,
        }
    }
}

impl From<SbicError> for CliError {
    fn from(value: SbicError) -> Self {
        Self::Sbic(value)
    }
}

/// Parsed CSV cells in row-major order.
#[derive(Clone, Debug)]
struct LoadedMatrix {
    path: PathBuf,
    layout: LayoutArg,
    values: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl LoadedMatrix {
    fn n_features(&self) -> usize {
        match self.layout {
            LayoutArg::Frames => self.cols,
            LayoutArg::Features => self.rows,
        }
    }

    fn n_frames(&self) -> usize {
        match self.layout {
            LayoutArg::Frames => self.rows,
            LayoutArg::Features => self.cols,
        }
    }

    fn as_view(&self) -> Result<FeatureView<'_>, CliError> {
        let layout = match self.layout {
            LayoutArg::Frames => MemoryLayout::FrameMajor,
            LayoutArg::Features => MemoryLayout::FeatureMajor,
        };
        FeatureView::from_f64(
            self.values.as_slice(),
            self.n_features(),
            self.n_frames(),
            layout,
        )
        .map_err(CliError::from)
    }

    fn summary(&self) -> InputSummary {
        InputSummary {
            path: self.path.display().to_string(),
            format: "csv",
            layout: self.layout.as_str(),
            n_features: self.n_features(),
            n_frames: self.n_frames(),
        }
    }
}

#[derive(Serialize)]
struct InputSummary {
    path: String,
    format: &'static str,
    layout: &'static str,
    n_features: usize,
    n_frames: usize,
}

#[derive(Serialize)]
struct SegmentOutput {
    command: &'static str,
    input: InputSummary,
    config: SbicConfig,
    segmentation: Vec<f64>,
    seg_values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds: Option<Vec<f64>>,
    result: SegmentationResult,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

/// Writes progress and telemetry lines to stderr.
struct StderrSink;

impl ProgressSink for StderrSink {
    fn on_progress(&self, fraction: f32) {
        eprintln!("sbic: progress {:.0}%", fraction * 100.0);
    }
}

impl TelemetrySink for StderrSink {
    fn record_scalar(&self, key: &'static str, value: f64) {
        eprintln!("sbic: {key}={value}");
    }
}

fn main() {
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let Some(cli) = parse_cli(args.as_slice())? else {
        return Ok(());
    };

    match cli.command {
        Command::Segment(args) => handle_segment(args),
    }
}

fn parse_cli(args: &[String]) -> Result<Option<Cli>, CliError> {
    if args.is_empty() || matches!(args[0].as_str(), "-h" | "--help") {
        print_root_help();
        return Ok(None);
    }
    if matches!(args[0].as_str(), "-V" | "--version") {
        print_version();
        return Ok(None);
    }

    let command_name = args[0].as_str();
    let rest = &args[1..];

    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_command_help(command_name)?;
        return Ok(None);
    }
    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        print_version();
        return Ok(None);
    }

    let command = match command_name {
        "segment" => Command::Segment(parse_segment_args(rest)?),
        _ => {
            return Err(CliError::invalid_input(format!(
                "unknown command '{command_name}'; expected one of: segment"
            )));
        }
    };

    Ok(Some(Cli { command }))
}

fn parse_segment_args(tokens: &[String]) -> Result<SegmentArgs, CliError> {
    let mut args = SegmentArgs::default();
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--input" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.input = PathBuf::from(raw);
            }
            "--layout" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.layout = LayoutArg::parse(raw.as_str())?;
            }
            "--config" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config = Some(PathBuf::from(raw));
            }
            "--size1" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.size1 = Some(parse_usize_arg(raw.as_str(), flag)?);
            }
            "--inc1" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.inc1 = Some(parse_usize_arg(raw.as_str(), flag)?);
            }
            "--size2" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.size2 = Some(parse_usize_arg(raw.as_str(), flag)?);
            }
            "--inc2" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.inc2 = Some(parse_usize_arg(raw.as_str(), flag)?);
            }
            "--cpw" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.cpw = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--fine-step" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.fine_step = Some(parse_fine_step(raw.as_str())?);
            }
            "--coarse-window" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.coarse_window = Some(parse_coarse_window(raw.as_str())?);
            }
            "--hop-size" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.hop_size = Some(parse_usize_arg(raw.as_str(), flag)?);
            }
            "--sample-rate" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.sample_rate = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            "--verbose" => {
                ensure_no_inline_value(flag, inline_value)?;
                args.verbose = true;
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown segment option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if args.input.as_os_str().is_empty() {
        return Err(CliError::invalid_input("segment requires --input <path>"));
    }
    if args.hop_size.is_some() != args.sample_rate.is_some() {
        return Err(CliError::invalid_input(
            "--hop-size and --sample-rate must be given together",
        ));
    }

    Ok(args)
}

fn split_flag(token: &str) -> Result<(&str, Option<String>), CliError> {
    if !token.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "unexpected positional argument '{token}'; expected --flag value"
        )));
    }
    if let Some((flag, value)) = token.split_once('=') {
        return Ok((flag, Some(value.to_string())));
    }
    Ok((token, None))
}

fn take_flag_value(
    flag: &str,
    inline_value: Option<String>,
    tokens: &[String],
    idx: &mut usize,
) -> Result<String, CliError> {
    if let Some(value) = inline_value {
        return Ok(value);
    }

    *idx += 1;
    let value = tokens
        .get(*idx)
        .ok_or_else(|| CliError::invalid_input(format!("{flag} requires a value")))?;
    if value.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "{flag} requires a value, but got option '{value}'"
        )));
    }
    Ok(value.clone())
}

fn ensure_no_inline_value(flag: &str, inline_value: Option<String>) -> Result<(), CliError> {
    if inline_value.is_some() {
        return Err(CliError::invalid_input(format!(
            "{flag} does not accept a value"
        )));
    }
    Ok(())
}

fn parse_usize_arg(raw: &str, flag: &str) -> Result<usize, CliError> {
    raw.parse::<usize>().map_err(|_| {
        CliError::invalid_input(format!(
            "{flag} expects a non-negative integer, got '{raw}'"
        ))
    })
}

fn parse_f64_arg(raw: &str, flag: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .map_err(|_| CliError::invalid_input(format!("{flag} expects a number, got '{raw}'")))
}

fn print_version() {
    println!("sbic {}", env!("CARGO_PKG_VERSION"));
}

fn print_root_help() {
    println!(
        "sbic {}\n\nUSAGE:\n  sbic <COMMAND> [OPTIONS]\n\nCOMMANDS:\n  segment   Segment a feature matrix at BIC change points\n\nGLOBAL OPTIONS:\n  -h, --help      Show help\n  -V, --version   Show version\n\nRun 'sbic <COMMAND> --help' for subcommand options.",
        env!("CARGO_PKG_VERSION")
    );
}

fn print_command_help(command: &str) -> Result<(), CliError> {
    match command {
        "segment" => {
            println!(
                "USAGE:\n  sbic segment --input <path.csv> [OPTIONS]\n\nOPTIONS:\n  --input <path>                     Required CSV feature matrix\n  --layout <frames|features>         Default: frames (one row per frame)\n  --config <path>                    JSON config; flags below override it\n  --size1 <usize>                    Default: 300\n  --inc1 <usize>                     Default: 60\n  --size2 <usize>                    Default: 200\n  --inc2 <usize>                     Default: 20\n  --cpw <float>                      Default: 1.5\n  --fine-step <coarse|fine>          Default: coarse (fine pass scans with inc1)\n  --coarse-window <sliding|anchored> Default: sliding\n  --hop-size <usize>                 With --sample-rate, report change points in seconds\n  --sample-rate <float>\n  --output <path>                    Write JSON output to file\n  --verbose                          Print progress and telemetry to stderr"
            );
            Ok(())
        }
        _ => Err(CliError::invalid_input(format!(
            "unknown command '{command}'; expected one of: segment"
        ))),
    }
}

fn handle_segment(args: SegmentArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let input = load_matrix(args.input.as_path(), args.layout)?;
    let view = input.as_view()?;

    let sink = StderrSink;
    let ctx = if args.verbose {
        ExecutionContext::new()
            .with_progress_sink(&sink)
            .with_telemetry_sink(&sink)
    } else {
        ExecutionContext::new()
    };

    let result = run_segmentation(&view, &config, &ctx)?;
    if args.verbose {
        for note in &result.diagnostics.notes {
            eprintln!("sbic: note: {note}");
        }
        for warning in &result.diagnostics.warnings {
            eprintln!("sbic: warning: {warning}");
        }
    }

    let seconds = match (args.hop_size, args.sample_rate) {
        (Some(hop_size), Some(sample_rate)) => Some(result.to_seconds(hop_size, sample_rate)?),
        _ => None,
    };

    write_json_output(
        &SegmentOutput {
            command: "segment",
            input: input.summary(),
            config,
            segmentation: result.segmentation(),
            seg_values: result.seg_values(),
            seconds,
            result,
        },
        args.output.as_deref(),
    )
}

/// Config file (if any) first, then individual flags on top.
fn resolve_config(args: &SegmentArgs) -> Result<SbicConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => SbicConfig::default(),
    };

    if let Some(size1) = args.size1 {
        config.size1 = size1;
    }
    if let Some(inc1) = args.inc1 {
        config.inc1 = inc1;
    }
    if let Some(size2) = args.size2 {
        config.size2 = size2;
    }
    if let Some(inc2) = args.inc2 {
        config.inc2 = inc2;
    }
    if let Some(cpw) = args.cpw {
        config.cpw = cpw;
    }
    if let Some(fine_step) = args.fine_step {
        config.fine_step = fine_step;
    }
    if let Some(coarse_window) = args.coarse_window {
        config.coarse_window = coarse_window;
    }

    config.validate()?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<SbicConfig, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    parse_config_document(raw.as_str())
}

fn parse_config_document(raw: &str) -> Result<SbicConfig, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::json("invalid config JSON", source))
}

fn load_matrix(path: &Path, layout: LayoutArg) -> Result<LoadedMatrix, CliError> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| {
            CliError::not_supported(format!(
                "unable to infer input format for '{}'; expected .csv",
                path.display()
            ))
        })?;
    if extension != "csv" {
        return Err(CliError::not_supported(format!(
            "unsupported input format '{extension}'; expected .csv"
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    let (values, rows, cols) = parse_csv_data(raw.as_str())?;
    Ok(LoadedMatrix {
        path: path.to_path_buf(),
        layout,
        values,
        rows,
        cols,
    })
}

fn parse_csv_data(raw: &str) -> Result<(Vec<f64>, usize, usize), CliError> {
    let rows = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return Err(CliError::invalid_input("CSV input is empty"));
    }

    match parse_csv_rows(rows.as_slice()) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            if rows.len() > 1
                && first_row_looks_like_header(rows[0], rows[1])
                && let Ok(without_header) = parse_csv_rows(&rows[1..])
            {
                return Ok(without_header);
            }
            Err(err)
        }
    }
}

fn parse_csv_rows(rows: &[&str]) -> Result<(Vec<f64>, usize, usize), CliError> {
    let mut values = Vec::<f64>::new();
    let mut expected_cols: Option<usize> = None;

    for (row_idx, row) in rows.iter().enumerate() {
        let cells = row.split(',').map(str::trim).collect::<Vec<_>>();

        match expected_cols {
            Some(cols) if cells.len() != cols => {
                return Err(CliError::invalid_input(format!(
                    "CSV row {} has {} columns but expected {}",
                    row_idx + 1,
                    cells.len(),
                    cols
                )));
            }
            Some(_) => {}
            None => expected_cols = Some(cells.len()),
        }

        for (col_idx, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                return Err(CliError::invalid_input(format!(
                    "CSV row {} column {} is empty",
                    row_idx + 1,
                    col_idx + 1
                )));
            }

            let value = cell.parse::<f64>().map_err(|_| {
                CliError::invalid_input(format!(
                    "CSV row {} column {} is not a valid float: '{}'",
                    row_idx + 1,
                    col_idx + 1,
                    cell
                ))
            })?;
            values.push(value);
        }
    }

    let cols = expected_cols.ok_or_else(|| CliError::invalid_input("CSV input is empty"))?;
    Ok((values, rows.len(), cols))
}

fn first_row_looks_like_header(first_row: &str, second_row: &str) -> bool {
    let first_cells = first_row.split(',').map(str::trim).collect::<Vec<_>>();
    let second_cells = second_row.split(',').map(str::trim).collect::<Vec<_>>();

    if first_cells.len() != second_cells.len()
        || first_cells.iter().any(|cell| cell.is_empty())
        || second_cells.iter().any(|cell| cell.is_empty())
    {
        return false;
    }

    let first_all_non_numeric = first_cells.iter().all(|cell| cell.parse::<f64>().is_err());
    let second_all_numeric = second_cells.iter().all(|cell| cell.parse::<f64>().is_ok());

    first_all_non_numeric && second_all_numeric
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CliError, LayoutArg, LoadedMatrix, SegmentArgs, parse_cli, parse_config_document,
        parse_csv_data, parse_segment_args, resolve_config,
    };
    use sbic_core::SbicError;
    use sbic_offline::{CoarseWindow, FineStep};
    use std::path::PathBuf;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn csv_parser_supports_rectangular_data() {
        let raw = "1.0,2.0\n3.0,4.0\n";
        let (values, rows, cols) = parse_csv_data(raw).expect("csv should parse");
        assert_eq!((rows, cols), (2, 2));
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn csv_parser_skips_single_header_row_when_present() {
        let raw = "mfcc0,mfcc1\n1.0,2.0\n3.0,4.0\n";
        let (values, rows, cols) = parse_csv_data(raw).expect("csv with header should parse");
        assert_eq!((rows, cols), (2, 2));
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn csv_parser_rejects_ragged_rows() {
        let raw = "1.0,2.0\n3.0\n";
        let err = parse_csv_data(raw).expect_err("ragged rows must fail");
        assert!(err.to_string().contains("CSV row 2 has 1 columns"));
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn layout_selects_matrix_orientation() {
        let (values, rows, cols) = parse_csv_data("1,10\n2,20\n3,30\n").expect("csv should parse");
        let by_frames = LoadedMatrix {
            path: PathBuf::from("x.csv"),
            layout: LayoutArg::Frames,
            values: values.clone(),
            rows,
            cols,
        };
        let view = by_frames.as_view().expect("view should build");
        assert_eq!((view.n_features, view.n_frames), (2, 3));
        assert_eq!(view.value(1, 2).expect("in bounds"), 30.0);

        let by_features = LoadedMatrix {
            layout: LayoutArg::Features,
            ..by_frames
        };
        let view = by_features.as_view().expect("view should build");
        assert_eq!((view.n_features, view.n_frames), (3, 2));
        assert_eq!(view.value(2, 0).expect("in bounds"), 3.0);
    }

    #[test]
    fn segment_args_accept_inline_and_separate_values() {
        let args = parse_segment_args(&tokens(&[
            "--input",
            "feat.csv",
            "--size1=120",
            "--inc1",
            "10",
            "--fine-step",
            "fine",
            "--coarse-window=anchored",
            "--layout",
            "features",
            "--verbose",
        ]))
        .expect("args should parse");
        assert_eq!(args.input, PathBuf::from("feat.csv"));
        assert_eq!(args.size1, Some(120));
        assert_eq!(args.inc1, Some(10));
        assert_eq!(args.fine_step, Some(FineStep::Fine));
        assert_eq!(args.coarse_window, Some(CoarseWindow::Anchored));
        assert_eq!(args.layout, LayoutArg::Features);
        assert!(args.verbose);
    }

    #[test]
    fn segment_args_reject_bad_input() {
        let err = parse_segment_args(&tokens(&["--size1", "3"]))
            .expect_err("missing --input must fail");
        assert!(err.to_string().contains("--input"));

        let err = parse_segment_args(&tokens(&["--input", "a.csv", "--cpw", "high"]))
            .expect_err("non-numeric cpw must fail");
        assert!(err.to_string().contains("--cpw expects a number"));

        let err = parse_segment_args(&tokens(&["--input", "a.csv", "--hop-size", "512"]))
            .expect_err("hop size alone must fail");
        assert!(err.to_string().contains("--sample-rate"));

        let err = parse_segment_args(&tokens(&["--input", "a.csv", "--verbose=yes"]))
            .expect_err("inline value on a switch must fail");
        assert!(err.to_string().contains("does not accept a value"));

        let err = parse_segment_args(&tokens(&["a.csv"])).expect_err("positional must fail");
        assert!(err.to_string().contains("unexpected positional argument"));
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let err = match parse_cli(&tokens(&["detect", "--input", "a.csv"])) {
            Ok(_) => panic!("unknown command must fail"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("unknown command 'detect'"));
    }

    #[test]
    fn flags_override_config_document() {
        let mut args = SegmentArgs {
            cpw: Some(0.5),
            inc2: Some(5),
            ..SegmentArgs::default()
        };
        let config = resolve_config(&args).expect("defaults plus flags should validate");
        assert_eq!(config.size1, 300);
        assert_eq!(config.inc2, 5);
        assert_eq!(config.cpw, 0.5);

        args.size1 = Some(0);
        let err = resolve_config(&args).expect_err("size1 = 0 must fail");
        assert!(matches!(err, CliError::Sbic(SbicError::InvalidInput(_))));
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn config_document_fills_missing_fields_with_defaults() {
        let config = parse_config_document(r#"{"size2": 80, "coarse_window": "Anchored"}"#)
            .expect("config should parse");
        assert_eq!(config.size2, 80);
        assert_eq!(config.coarse_window, CoarseWindow::Anchored);
        assert_eq!(config.inc1, 60);

        let err = parse_config_document("[1, 2]").expect_err("arrays must fail");
        assert_eq!(err.code(), "json_error");
    }
}
