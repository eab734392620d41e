use std::path::PathBuf;
use std::process::ExitCode;

use angle_calibrator::calibration::CalibrationEngine;
use angle_calibrator::config::AppConfig;
use angle_calibrator::device::{SimulatedDevice, SimulatedResponse};
use angle_calibrator::fitting::GaussianFitter;
use angle_calibrator::measurement::{HttpMeasurementClient, MeasurementInterface};
use angle_calibrator::report::{self, ReportPaths};
use angle_calibrator::search::SearchStrategyKind;
use angle_calibrator::CalibrationResult;
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\n✗ Error during calibration: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "angle-calibrator",
    about = "Find the angle of peak device response"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        match self.command {
            Command::Run(args) => run_command(args),
            Command::Serve(args) => serve_command(args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one calibration and write the JSON report and plot.
    Run(RunArgs),
    /// Host the simulated device over HTTP (requires sim_device feature).
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Measurement server base URL (overrides the config file).
    #[arg(long)]
    url: Option<String>,
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Search strategy (overrides the config file).
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Directory for the JSON report and plot.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Calibrate against the in-process simulated device instead of a server.
    #[arg(long, default_value_t = false)]
    simulate: bool,
    /// Seed for the simulated device.
    #[arg(long, requires = "simulate")]
    seed: Option<u64>,
    /// Skip rendering the SVG plot.
    #[arg(long, default_value_t = false)]
    no_plot: bool,
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Host interface for the simulated device.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to listen on.
    #[arg(long, default_value_t = 8_000)]
    port: u16,
    /// Seed for the simulated readings.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum StrategyArg {
    CoarseToFine,
    Uniform,
}

impl From<StrategyArg> for SearchStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::CoarseToFine => SearchStrategyKind::CoarseToFine,
            StrategyArg::Uniform => SearchStrategyKind::Uniform,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run_command(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let result = if args.simulate {
        let device = SimulatedDevice::new(SimulatedResponse::default(), args.seed);
        calibrate(device, &config)?
    } else {
        let client = HttpMeasurementClient::new(&config.client)
            .context("creating measurement client")?;
        calibrate(client, &config)?
    };

    if !result.is_reliable() {
        println!("\nWarning: Calibration results may be unreliable.");
        for warning in &result.validation.warnings {
            println!("  - {warning}");
        }
    }
    println!("{}", report::format_summary(&result));

    let paths = ReportPaths::from_config(&config.report);
    report::write_json_report(&result, &paths.json)
        .with_context(|| format!("writing {}", paths.json.display()))?;
    println!("\n✓ Results saved to: {}", paths.json.display());

    if !args.no_plot {
        let fitter = GaussianFitter::new(config.fitting.clone());
        report::render_plot(&result, &fitter, &paths.plot, &config.report)
            .with_context(|| format!("rendering {}", paths.plot.display()))?;
        println!("✓ Plot saved to: {}", paths.plot.display());
    }

    println!("\n✓ Calibration completed successfully!");
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };
    if let Some(url) = &args.url {
        config.client.base_url = url.clone();
    }
    if let Some(strategy) = args.strategy {
        config.search.strategy = strategy.into();
    }
    if let Some(dir) = &args.output_dir {
        config.report.output_dir = dir.display().to_string();
    }
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn calibrate<M: MeasurementInterface>(
    interface: M,
    config: &AppConfig,
) -> Result<CalibrationResult> {
    let mut engine = CalibrationEngine::from_config(interface, config)?;
    let result = engine.calibrate().context("calibration run failed")?;
    Ok(result)
}

fn serve_command(args: ServeArgs) -> Result<()> {
    #[cfg(feature = "sim_device")]
    {
        return serve_impl(args);
    }

    #[cfg(not(feature = "sim_device"))]
    {
        let _ = args;
        anyhow::bail!("angle-calibrator serve requires the sim_device feature");
    }
}

#[cfg(feature = "sim_device")]
fn serve_impl(args: ServeArgs) -> Result<()> {
    use angle_calibrator::device::server;
    use std::net::SocketAddr;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let device = SimulatedDevice::new(SimulatedResponse::default(), args.seed);
    println!("Simulated device running on http://{addr}");
    println!("Press Ctrl+C to stop.");
    server::serve(addr, device)
}
