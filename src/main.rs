// src/main.rs - Command line front end and HTTP server
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use scurve_calc::calculator::Adjustments;
use scurve_calc::export::{ExportFormat, write_json, write_samples};
use scurve_calc::motion::ProfileSummary;
use scurve_calc::{
    CalcError, CalculationReport, Check, Config, MoveRequest, ProfileSolution, RequestOverrides,
    calculate, load_config,
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Jerk-limited motion profile calculator
#[derive(Parser, Debug)]
#[command(name = "scurve-calc", version, about = "Seven-phase S-curve profiles for point-to-point moves on linear drives.")]
struct Cli {
    /// Path to a TOML config file (overrides defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve a move and print phase times and peaks as JSON
    Solve(MoveArgs),
    /// Solve a move and export the sampled profile
    Sample {
        #[command(flatten)]
        args: MoveArgs,
        /// Number of evenly spaced points
        #[arg(long)]
        points: Option<usize>,
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a move against the limits of a configured drive
    Check(MoveArgs),
    /// List configured drives
    Drives,
    /// Serve the HTTP API
    Serve {
        /// Address to listen on (e.g. 0.0.0.0:3000)
        #[arg(long)]
        bind: Option<String>,
    },
}

/// Move parameters; anything left out comes from the `[defaults]` section.
#[derive(Args, Debug, Default)]
struct MoveArgs {
    /// Travel distance (mm)
    #[arg(long)]
    distance: Option<f64>,
    /// Maximum speed (mm/s)
    #[arg(long)]
    speed: Option<f64>,
    /// Maximum acceleration (m/s²)
    #[arg(long)]
    accel: Option<f64>,
    /// Maximum jerk (m/s³), 0 for a trapezoidal profile
    #[arg(long)]
    jerk: Option<f64>,
    /// Moving mass of the motor (g)
    #[arg(long)]
    motor_mass: Option<f64>,
    /// Payload mass (g)
    #[arg(long)]
    payload_mass: Option<f64>,
    /// Peak force (N)
    #[arg(long)]
    force: Option<f64>,
    /// Derive acceleration and jerk from force and mass
    #[arg(long, conflicts_with = "no_derive")]
    derive: bool,
    /// Keep acceleration and jerk as given
    #[arg(long)]
    no_derive: bool,
    /// Configured drive supplying mass, force and limits
    #[arg(long)]
    drive: Option<String>,
    /// Do not clamp distance and speed to the drive limits
    #[arg(long)]
    no_clamp: bool,
}

impl MoveArgs {
    fn overrides(&self, point_count: Option<usize>) -> RequestOverrides {
        let derive_acceleration = match (self.derive, self.no_derive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        RequestOverrides {
            distance_mm: self.distance,
            max_speed_mm_s: self.speed,
            max_accel_m_s2: self.accel,
            max_jerk_m_s3: self.jerk,
            motor_mass_g: self.motor_mass,
            payload_mass_g: self.payload_mass,
            max_force_n: self.force,
            derive_acceleration,
            drive: self.drive.clone(),
            clamp_to_drive: self.no_clamp.then_some(false),
            point_count,
        }
    }
}

/// Everything in a report except the samples.
#[derive(Serialize)]
struct SolveOutput<'a> {
    request: &'a MoveRequest,
    derived_acceleration_m_s2: Option<f64>,
    drive: Option<&'a str>,
    solution: &'a ProfileSolution,
    adjustments: &'a Adjustments,
    summary: &'a ProfileSummary,
    checks: &'a [Check],
}

impl<'a> From<&'a CalculationReport> for SolveOutput<'a> {
    fn from(report: &'a CalculationReport) -> Self {
        Self {
            request: &report.request,
            derived_acceleration_m_s2: report.derived_acceleration_m_s2,
            drive: report.drive.as_deref(),
            solution: &report.solution,
            adjustments: &report.adjustments,
            summary: &report.summary,
            checks: &report.checks,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading configuration from: {}", path.display());
            load_config(path).map_err(|e| {
                tracing::error!("Failed to load config from '{}': {}", path.display(), e);
                Box::new(e) as BoxError
            })?
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::Solve(args) => {
            let report = run_calculation(&config, &args, None)?;
            print_json(&SolveOutput::from(&report))?;
        }
        Commands::Sample {
            args,
            points,
            format,
            output,
        } => {
            let report = run_calculation(&config, &args, points)?;
            export_samples(&report, format, output.as_deref())?;
        }
        Commands::Check(args) => {
            if args.drive.is_none() {
                tracing::error!("check needs --drive");
                return Ok(ExitCode::from(2));
            }
            let report = run_calculation(&config, &args, None)?;
            for check in &report.checks {
                println!("{}", check);
            }
            if report.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Drives => {
            if config.drives.is_empty() {
                tracing::info!("No drives configured");
            }
            for drive in &config.drives {
                println!(
                    "{}: stroke {}mm, speed {}mm/s, force {}N, moving mass {}g",
                    drive.name,
                    drive.max_stroke_mm,
                    drive.max_speed_mm_s,
                    drive.max_force_n,
                    drive.moving_mass_g
                );
            }
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let app = scurve_calc::web::api::create_router(Arc::new(config));
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            tracing::info!("Web API listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_calculation(
    config: &Config,
    args: &MoveArgs,
    point_count: Option<usize>,
) -> Result<CalculationReport, CalcError> {
    let input = args.overrides(point_count).resolve(config)?;
    let report = calculate(&input).inspect_err(|e| tracing::error!("{}", e))?;
    let adjustments = &report.adjustments;
    if adjustments.velocity_limited {
        tracing::info!(
            "Speed limited to {:.1}mm/s (requested {}mm/s)",
            adjustments.actual_speed_mm_s,
            adjustments.requested_speed_mm_s
        );
    }
    if adjustments.jerk_min_limited {
        tracing::info!(
            "Jerk raised to {:.1}m/s³ (requested {}m/s³)",
            adjustments.actual_jerk_m_s3,
            adjustments.requested_jerk_m_s3
        );
    }
    Ok(report)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CalcError> {
    let mut stdout = io::stdout().lock();
    write_json(value, &mut stdout)?;
    writeln!(stdout)?;
    Ok(())
}

fn export_samples(
    report: &CalculationReport,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<(), CalcError> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_samples(&report.samples, format, &mut writer)?;
            writer.flush()?;
            tracing::info!("Wrote {} samples to {}", report.samples.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_samples(&report.samples, format, &mut stdout)?;
            if format == ExportFormat::Json {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}
