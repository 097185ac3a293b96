use anyhow::Result;
use clap::{Parser, ValueEnum};
use image_forensics::config::AppConfig;
use image_forensics::exporter;
use image_forensics::processor;
use image_forensics::report::{writers_for, ReportWriter};
use image_forensics::report_writers::text::TextReportWriter;
use image_forensics::walker;
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Json,
    Text,
    Both,
}

#[derive(Parser, Debug)]
#[command(
    name = "image-forensics",
    version,
    about = "Extract metadata and forensic indicators from image files"
)]
struct Cli {
    /// Image file or directory to analyze
    input: PathBuf,

    /// Directory for exported reports (batch mode defaults to the configured
    /// output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format for exports
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// JPEG quality for the ELA recompression pass (1-100)
    #[arg(long)]
    ela_quality: Option<u8>,

    /// Save the amplified ELA difference image next to the reports
    #[arg(long)]
    ela_image: bool,

    /// Number of worker threads for batch analysis
    #[arg(long)]
    workers: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl ReportFormat {
    fn names(self) -> Vec<String> {
        match self {
            ReportFormat::Json => vec!["json".to_string()],
            ReportFormat::Text => vec!["text".to_string()],
            ReportFormat::Both => vec!["json".to_string(), "text".to_string()],
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::new()?;
    if let Some(format) = cli.format {
        config.report_formats = format.names();
    }
    if let Some(quality) = cli.ela_quality {
        config.ela.quality = quality.clamp(1, 100);
    }
    if cli.ela_image {
        config.ela.save_visualization = true;
    }
    if let Some(workers) = cli.workers {
        config.num_workers = workers.max(1);
    }
    if let Some(output) = &cli.output {
        config.output_directory = output.display().to_string();
    }

    let filter = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level.parse().unwrap_or(log::LevelFilter::Info)
    };
    env_logger::Builder::new().filter_level(filter).init();

    info!("Starting image-forensics");

    if cli.input.is_dir() {
        run_batch(config, &cli)?;
    } else {
        run_single(config, &cli)?;
    }

    info!("image-forensics finished");
    Ok(())
}

fn run_single(config: AppConfig, cli: &Cli) -> Result<()> {
    let report = processor::analyze_file(&config, &cli.input)?;

    // The text rendering doubles as the on-screen summary.
    print!("{}", TextReportWriter.render(&report)?);

    if cli.output.is_some() {
        let writers = writers_for(&config.report_formats)?;
        let out_dir = PathBuf::from(&config.output_directory);
        exporter::export_report(&out_dir, &writers, &report)?;
    }
    Ok(())
}

fn run_batch(config: AppConfig, cli: &Cli) -> Result<()> {
    let writers = writers_for(&config.report_formats)?;
    let out_dir = PathBuf::from(&config.output_directory);

    let (paths_tx, paths_rx) = crossbeam_channel::unbounded();
    let (reports_tx, reports_rx) = crossbeam_channel::unbounded();

    let walker_config = config.clone();
    let root = cli.input.clone();
    let walker_handle = std::thread::spawn(move || {
        if let Err(e) = walker::start_walking(&root, &walker_config, paths_tx) {
            log::error!("Walker error: {}", e);
        }
    });

    let processor_config = config.clone();
    let processor_handle = std::thread::spawn(move || {
        if let Err(e) = processor::start_processing(processor_config, paths_rx, reports_tx) {
            log::error!("Processor error: {}", e);
        }
    });

    exporter::start_exporting(&out_dir, &writers, reports_rx)?;

    walker_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walker thread panicked"))?;
    processor_handle
        .join()
        .map_err(|_| anyhow::anyhow!("processor thread panicked"))?;

    log::info!("Batch analysis complete.");
    Ok(())
}
