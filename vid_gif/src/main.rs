use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use shared_utils::logging::LogConfig;
use shared_utils::{
    collect_video_files, print_simple_summary, print_summary_report, require_ffmpeg,
    BatchResult, CancelToken, FileSize, Vid2GifError,
};
use vid_gif::{
    encode, encode_with_budget, resolve_output_path, validate_input, GifConfig, QualityPreset,
    DEFAULT_FPS,
};

#[derive(Parser)]
#[command(name = "vid-gif")]
#[command(version, about = "Video to GIF converter - two-pass palette encoding with size targeting", long_about = None)]
struct Cli {
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, default_value = "medium")]
    quality: QualityPreset,

    #[arg(long, value_name = "MB")]
    max_size: Option<f64>,

    #[arg(long)]
    fps: Option<u32>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    colors: Option<u16>,

    #[arg(long)]
    start: Option<f64>,

    #[arg(long)]
    end: Option<f64>,

    #[arg(short, long, default_value_t = true)]
    recursive: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let _ = shared_utils::logging::init_logging("vid_gif", LogConfig::default());

    let cli = Cli::parse();

    if let Err(e) = require_ffmpeg() {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }

    if let Some(mb) = cli.max_size {
        if !(mb > 0.0) {
            eprintln!("❌ Error: --max-size must be greater than 0");
            std::process::exit(1);
        }
    }

    let mut base_config = GifConfig::from_preset(cli.quality);
    if cli.fps.is_some() {
        base_config.fps = cli.fps;
    }
    if cli.width.is_some() {
        base_config.width = cli.width;
    }
    if let Some(colors) = cli.colors {
        base_config.colors = colors;
    }
    base_config.start = cli.start;
    base_config.end = cli.end;
    base_config.verbose = cli.verbose;

    if let Err(e) = base_config.validate() {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }

    let mut files = Vec::new();
    for input in &cli.inputs {
        if input.is_dir() {
            files.extend(collect_video_files(input, cli.recursive));
        } else if input.exists() {
            files.push(input.clone());
        } else {
            eprintln!("❌ Error: Input path does not exist: {}", input.display());
            std::process::exit(1);
        }
    }

    if files.is_empty() {
        eprintln!("❌ Error: No video files found");
        std::process::exit(1);
    }

    let batch = files.len() > 1 || cli.inputs.iter().any(|p| p.is_dir());
    let budget = cli.max_size.map(FileSize::from_mb_f64);

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!("\n⚠️  Cancellation requested, cleaning up...");
            cancel.cancel();
        })?;
    }

    info!("🎬 Video → GIF Conversion");
    info!(
        "   Quality: {} ({})",
        cli.quality.as_str(),
        cli.quality.description()
    );
    match base_config.fps {
        Some(fps) => info!("   Frame rate: {} fps", fps),
        None => info!("   Frame rate: AUTO (from source)"),
    }
    if let Some(width) = base_config.width {
        info!("   Width: {} px", width);
    }
    info!("   Colors: {}", base_config.colors);
    if let Some(mb) = cli.max_size {
        info!("   📦 Size target: {:.1} MB", mb);
    }
    if cli.recursive && cli.inputs.iter().any(|p| p.is_dir()) {
        info!("   📂 Recursive: ENABLED");
    }
    if base_config.start.is_some() || base_config.end.is_some() {
        info!(
            "   ✂️  Trim: {} → {}",
            base_config
                .start
                .map_or_else(|| "source start".to_string(), |s| format!("{}s", s)),
            base_config
                .end
                .map_or_else(|| "source end".to_string(), |e| format!("{}s", e)),
        );
    }
    if cli.verbose {
        info!("   📢 Verbose FFmpeg output: ENABLED");
    }
    info!("");

    let started = Instant::now();
    let mut results = BatchResult::new();
    let mut total_input = FileSize::ZERO;
    let mut total_output = FileSize::ZERO;
    let mut budget_missed = 0usize;

    for file in &files {
        if cancel.is_cancelled() {
            break;
        }

        if let Err(e) = validate_input(file) {
            eprintln!("⚠️  Skipping {}: {}", file.display(), e);
            results.skip();
            continue;
        }

        let mut config = base_config.clone();
        config.apply_smart_defaults(file);

        let output_path = match resolve_output_path(file, cli.output.as_deref(), batch) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("❌ {}: {}", file.display(), e);
                results.fail(file.clone(), e.to_string());
                continue;
            }
        };

        info!("🎞️  {} → {}", file.display(), output_path.display());
        let input_size = FileSize::new(fs::metadata(file).map(|m| m.len()).unwrap_or(0));

        let outcome = match budget {
            Some(budget) => {
                encode_with_budget(file, &output_path, &config, budget, &cancel).map(|search| {
                    if search.met_budget {
                        if search.attempts > 1 {
                            info!("   📦 Met size target after {} attempts", search.attempts);
                        }
                    } else {
                        budget_missed += 1;
                        let width = search
                            .config
                            .width
                            .map_or_else(|| "source".to_string(), |w| w.to_string());
                        eprintln!(
                            "⚠️  Size target missed: {} > {} after {} attempts (kept fps={}, width={})",
                            search.output_size,
                            budget,
                            search.attempts,
                            search.config.fps.unwrap_or(DEFAULT_FPS),
                            width,
                        );
                    }
                    search.output_size
                })
            }
            None => encode(file, &output_path, &config, &cancel),
        };

        match outcome {
            Ok(size) => {
                info!("✅ {} ({})", output_path.display(), size);
                results.success();
                total_input = total_input.saturating_add(input_size);
                total_output = total_output.saturating_add(size);
            }
            Err(Vid2GifError::Cancelled) => {
                eprintln!("⚠️  Cancelled while converting {}", file.display());
                results.fail(file.clone(), "cancelled".to_string());
                break;
            }
            Err(e) => {
                eprintln!("❌ {}: {}", file.display(), e);
                results.fail(file.clone(), e.to_string());
            }
        }
    }

    if results.total > 1 {
        print_summary_report(
            &results,
            started.elapsed(),
            total_input,
            total_output,
            "GIF Conversion",
        );
        if budget_missed > 0 {
            eprintln!("⚠️  Size target missed on {} file(s)", budget_missed);
        }
    }
    print_simple_summary(&results);

    if results.succeeded == 0 {
        std::process::exit(1);
    }
    Ok(())
}
