use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use dpi_awareness::awareness::{OsFeatureLevel, SharedHost, SimulatedHost, system_host};
use dpi_awareness::config::DpiConfig;
use dpi_awareness::scaling::{ScaleState, load_bitmap, save_bitmap};
use dpi_awareness::{CapabilityTier, DpiServices, HasRecoverySuggestion, HasSeverity, Recoverable};
use dpi_resample::select_resampling_mode;

/// Inspect DPI awareness negotiation and logical-to-device scaling.
#[derive(Parser, Debug)]
#[command(name = "dpictl", version)]
#[command(about = "🖥️  Probe DPI awareness and convert logical units to device pixels")]
#[command(long_about = "Probe which DPI awareness API the host exposes, declare the configured process tier,
and convert logical values and bitmaps to device resolution.")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true, help = "Path to a JSON DpiConfig file")]
    config: Option<PathBuf>,

    /// Process tier to declare, overriding the configuration
    #[arg(long, global = true, value_enum,
          help = "Process tier to declare at startup (overrides process_tier from --config)")]
    tier: Option<CapabilityTier>,

    /// Run against an in-memory host instead of the real OS
    #[arg(long, global = true, value_enum,
          help = "Simulate a host at this OS feature level (legacy, tier1, tier2, tier3)")]
    simulate: Option<OsFeatureLevel>,

    /// Device DPI reported by the simulated host
    #[arg(long, global = true, default_value_t = 96,
          help = "DPI reported by the simulated host (ignored without --simulate)")]
    simulate_dpi: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the feature level, the process and thread tiers, and the scale state
    Probe {
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
    /// Convert logical values to device pixels
    Convert {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i32>,
        #[arg(long, help = "Convert for this DPI instead of the device DPI")]
        dpi: Option<u32>,
    },
    /// Show the resampling mode chosen for a scaling factor
    Mode { factor: f64 },
    /// Rescale an image file from logical to device resolution
    Rescale {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, help = "Rescale for this DPI instead of the device DPI")]
        dpi: Option<u32>,
    },
}

#[derive(Serialize)]
struct ProbeReport {
    feature_level: OsFeatureLevel,
    process_declared: bool,
    process_tier: CapabilityTier,
    thread_tier: CapabilityTier,
    per_monitor_v2_active: bool,
    dpi_changed_improvements: bool,
    scale: ScaleState,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DpiConfig::load(path)?,
        None => DpiConfig::default(),
    };
    if let Some(tier) = cli.tier {
        config.process_tier = tier;
        config.validate()?;
    }
    init_tracing(&config.log_filter)?;

    match cli.command {
        Command::Mode { factor } => {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(anyhow!("Scaling factor must be positive, got {}", factor));
            }
            println!("{}", select_resampling_mode(factor));
            Ok(())
        }
        Command::Probe { json } => {
            let services = DpiServices::initialize(&config, build_host(cli.simulate, cli.simulate_dpi))?;
            probe(&services, json)
        }
        Command::Convert { values, dpi } => {
            let services = DpiServices::initialize(&config, build_host(cli.simulate, cli.simulate_dpi))?;
            let converted: Vec<String> = values
                .iter()
                .map(|&v| services.units.to_device_for_dpi(v, dpi.unwrap_or(0)).to_string())
                .collect();
            println!("{}", converted.join(" "));
            Ok(())
        }
        Command::Rescale { input, output, dpi } => {
            // An explicit DPI pins the whole run, mode selection included.
            let host = match dpi {
                Some(dpi) => build_host(Some(cli.simulate.unwrap_or(OsFeatureLevel::Tier3)), dpi),
                None => build_host(cli.simulate, cli.simulate_dpi),
            };
            let mut services = DpiServices::initialize(&config, host)?;
            rescale(&mut services, &input, &output)
        }
    }
}

fn init_tracing(fallback: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .with_context(|| format!("Invalid log filter: {}", fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_host(simulate: Option<OsFeatureLevel>, dpi: u32) -> SharedHost {
    match simulate {
        Some(level) => Arc::new(SimulatedHost::new(level).with_dpi(dpi)),
        None => system_host(),
    }
}

fn probe(services: &DpiServices, json: bool) -> Result<()> {
    let controller = &services.controller;
    let report = ProbeReport {
        feature_level: controller.feature_level(),
        process_declared: services.process_declared,
        process_tier: controller.get_process_capability(),
        thread_tier: controller.get_thread_capability().tier(),
        per_monitor_v2_active: controller.is_per_monitor_v2_active(),
        dpi_changed_improvements: services.units.dpi_changed_improvements_enabled(),
        scale: services.units.state(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("feature level:          {}", report.feature_level);
    println!("process declared:       {}", report.process_declared);
    println!("process tier:           {}", report.process_tier);
    println!("thread tier:            {}", report.thread_tier);
    println!("per-monitor v2 active:  {}", report.per_monitor_v2_active);
    println!("dpi-changed relayout:   {}", report.dpi_changed_improvements);
    println!(
        "device dpi:             {} (factor {:.2})",
        report.scale.device_dpi, report.scale.scaling_factor
    );
    println!("scaling requirement:    {}", report.scale.scaling_requirement_met);
    Ok(())
}

fn rescale(services: &mut DpiServices, input: &Path, output: &Path) -> Result<()> {
    let source = load_bitmap(input)?;
    let target = services.units.to_device_size(source.size());
    let outcome = services.rescaler.rescale_to_size(&source, target)?;
    if let Some(reason) = outcome.condition() {
        if !reason.is_recoverable() {
            return Err(anyhow!("Rescale failed: {}", reason));
        }
        eprintln!("{:?}: {}", reason.severity(), reason);
        if let Some(suggestion) = reason.recovery_suggestion() {
            eprintln!("  hint: {}", suggestion);
        }
    }
    let mode = services.rescaler.resampling_mode();
    save_bitmap(outcome.image(), output)?;
    println!(
        "{} -> {} ({}, factor {:.2})",
        source.size(),
        outcome.image().size(),
        mode,
        services.units.scaling_factor()
    );
    Ok(())
}
