//! capsolve CLI - read codes from images and build reference tables.

use capsolve_core::{ImageFormat, Pix};
use capsolve_recog::preprocess::clean;
use capsolve_recog::solver::evaluate;
use capsolve_recog::{Solver, SolverParams, calibrate_dir};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "capsolve")]
#[command(about = "Read six-character codes from fixed-layout noisy images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the code in one or more images.
    Solve(SolveArgs),

    /// Build a reference table from a directory of labeled images.
    Calibrate(CalibrateArgs),

    /// Print the glyph features of an image (JSON).
    Features(ImageArgs),

    /// Write the cleaned glyph band of an image.
    Clean {
        #[command(flatten)]
        input: ImageArgs,

        /// Path to write the binary band (.pgm/.pnm, otherwise PNG).
        #[arg(long)]
        out: PathBuf,
    },

    /// Print the default parameters (JSON).
    Params,
}

#[derive(Debug, Clone, Args)]
struct SolveArgs {
    /// Images to read.
    #[arg(long, required = true, num_args = 1..)]
    image: Vec<PathBuf>,

    /// Blank background image.
    #[arg(long)]
    baseline: PathBuf,

    /// Reference table tried first.
    #[arg(long)]
    bold: PathBuf,

    /// Reference table tried when the first is ambiguous.
    #[arg(long)]
    slim: Option<PathBuf>,

    /// Parameter file (JSON); missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print full reports as JSON lines instead of the text only.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct CalibrateArgs {
    /// Directory of images named after their code.
    #[arg(long)]
    corpus: PathBuf,

    /// Blank background image.
    #[arg(long)]
    baseline: PathBuf,

    /// Name of the table.
    #[arg(long, default_value = "bold")]
    name: String,

    /// Path to write the table (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Parameter file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ImageArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    /// Blank background image.
    #[arg(long)]
    baseline: PathBuf,

    /// Parameter file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve(args) => run_solve(&args),
        Commands::Calibrate(args) => run_calibrate(&args),
        Commands::Features(args) => run_features(&args),
        Commands::Clean { input, out } => run_clean(&input, &out),
        Commands::Params => run_params(),
    }
}

fn load_params(config: Option<&Path>) -> CliResult<SolverParams> {
    match config {
        Some(path) => {
            log::info!("Loading parameters: {}", path.display());
            Ok(SolverParams::from_json_file(path)?)
        }
        None => Ok(SolverParams::default()),
    }
}

fn load_image(path: &Path) -> CliResult<Pix> {
    capsolve_io::read_image(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })
}

/// Load the image, baseline and parameters of a feature-only command.
fn load_inputs(args: &ImageArgs) -> CliResult<(Pix, Pix, SolverParams)> {
    let params = load_params(args.config.as_deref())?;
    params.validate()?;
    let baseline = load_image(&args.baseline)?;
    let image = load_image(&args.image)?;
    Ok((image, baseline, params))
}

fn run_solve(args: &SolveArgs) -> CliResult<()> {
    let params = load_params(args.config.as_deref())?;

    let mut tables: Vec<(&str, &Path)> = vec![("bold", args.bold.as_path())];
    if let Some(slim) = &args.slim {
        tables.push(("slim", slim.as_path()));
    }
    let solver = Solver::from_files(&args.baseline, &tables, params)?;
    log::info!("Loaded {} reference table(s)", solver.tables().len());

    for path in &args.image {
        let report = solver.solve_file(path)?;
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}\t{}", path.display(), report.result);
        }
        log::info!(
            "{}: {:?} via {} table after {} attempt(s)",
            path.display(),
            report.result.kind(),
            report.table,
            report.attempts
        );
    }

    Ok(())
}

fn run_calibrate(args: &CalibrateArgs) -> CliResult<()> {
    let params = load_params(args.config.as_deref())?;
    let baseline = load_image(&args.baseline)?;

    log::info!("Calibrating {} table from {}", args.name, args.corpus.display());
    let report = calibrate_dir(&args.corpus, &baseline, &params, &args.name)?;
    log::info!(
        "{} characters from {} samples ({} skipped)",
        report.table.len(),
        report.used,
        report.skipped
    );

    report.table.write_json_file(&args.out)?;
    log::info!("Table written to {}", args.out.display());
    Ok(())
}

fn run_features(args: &ImageArgs) -> CliResult<()> {
    let (image, baseline, params) = load_inputs(args)?;
    let features = evaluate(&image, &baseline, &params)?;
    log::info!("{} glyph(s) in {}", features.len(), args.image.display());
    println!("{}", serde_json::to_string_pretty(&features)?);
    Ok(())
}

fn run_clean(args: &ImageArgs, out: &Path) -> CliResult<()> {
    let (image, baseline, params) = load_inputs(args)?;
    let band = clean(&image, &baseline, &params.preprocess)?;

    let format = capsolve_io::format_from_extension(out);
    if format == ImageFormat::Jpeg {
        return Err(format!("cannot write JPEG: {}", out.display()).into());
    }
    capsolve_io::write_image(&band, out, format)?;
    log::info!("Band written to {}", out.display());
    Ok(())
}

fn run_params() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&SolverParams::default())?);
    Ok(())
}
