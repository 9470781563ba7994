use clap::{ArgAction, Parser, Subcommand};
use image_press::batch::{self, BatchJob};
use image_press::config::{self, DEFAULT_CONFIG_FILE, ToolConfig};
use image_press::imaging::calculations::MAX_PERCENT;
use image_press::imaging::{Quality, TargetFormat, TargetSpec, supported_input_extensions};
use image_press::output;
use image_press::session::{Artifact, Session};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CommandResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "image-press")]
#[command(about = "Resize, convert and compress images")]
#[command(long_about = "\
Resize, convert and compress images

Reads JPEG, PNG, GIF, WebP, BMP and TIFF. Writes JPEG, PNG, WebP and BMP.
Transparent areas become white (or [background] color) when the target
format has no alpha channel.

Single images:
  image-press resize photo.jpg --width 400        # → resized-image.png
  image-press convert logo.png --to jpg           # → converted-image.jpg

Many images:
  image-press batch shots/ --out-dir web --to webp --width 1200

Settings are read from ./image-press.toml when present. Run
'image-press gen-config' to generate a documented one.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./image-press.toml if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Image to resize
    input: PathBuf,
    /// Target width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,
    /// Target height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,
    /// Scale both axes to this percentage of the original (1-200)
    #[arg(
        long,
        conflicts_with_all = ["width", "height"],
        value_parser = clap::value_parser!(u32).range(1..=MAX_PERCENT as i64)
    )]
    percent: Option<u32>,
    /// Edit width and height independently
    #[arg(long)]
    no_aspect_lock: bool,
    /// Output file (default: resized-image.png)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Image to convert
    input: PathBuf,
    /// Target format: jpg, png, webp, bmp or a MIME type (default: [output] format)
    #[arg(long)]
    to: Option<String>,
    /// Lossy quality, 0.0-1.0 (default: [output] quality)
    #[arg(long)]
    quality: Option<f32>,
    /// Output file (default: converted-image.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct BatchArgs {
    /// Files or directories to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Directory for converted files
    #[arg(long)]
    out_dir: PathBuf,
    /// Target format (default: [output] format)
    #[arg(long)]
    to: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,
    /// Lossy quality, 0.0-1.0 (default: [output] quality)
    #[arg(long)]
    quality: Option<f32>,
    /// Write a JSON report of every file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Resize one image to PNG
    Resize(ResizeArgs),
    /// Convert one image to another format
    Convert(ConvertArgs),
    /// Convert many images into a directory, in parallel
    Batch(BatchArgs),
    /// List output formats and readable inputs
    Formats,
    /// Print a stock image-press.toml with all options documented
    GenConfig,
}

impl Command {
    /// Phrase used in the one-line failure notice.
    fn action(&self) -> &'static str {
        match self {
            Self::Resize(_) => "resizing image",
            Self::Convert(_) => "converting image format",
            Self::Batch(_) => "running batch",
            Self::Formats | Self::GenConfig => "loading config",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let action = cli.command.action();
    let result = load_tool_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Resize(args) => resize(&config, args),
        Command::Convert(args) => convert(&config, args),
        Command::Batch(args) => run_batch(&config, args),
        Command::Formats => {
            output::print_formats_table(supported_input_extensions());
            Ok(())
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(action, &e);
            ExitCode::FAILURE
        }
    }
}

/// Route `log` records to stderr. `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// `--config` must exist; the implicit `./image-press.toml` may be absent.
fn load_tool_config(path: Option<&Path>) -> Result<ToolConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) => config::load_explicit_config(path)?,
        None => config::load_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    Ok(config)
}

fn open_session(config: &ToolConfig, input: &Path) -> Result<Session, Box<dyn Error>> {
    let bytes = std::fs::read(input)?;
    let mut session = Session::new(config.transform_settings());
    let notice = session.load(&bytes, None)?;
    output::print_notice(&notice);
    Ok(session)
}

fn resize(config: &ToolConfig, args: ResizeArgs) -> CommandResult {
    let mut session = open_session(config, &args.input)?;
    if args.no_aspect_lock || !config.resize.aspect_lock {
        session.toggle_aspect_lock();
    }

    let notice = match (args.percent, args.width, args.height) {
        (Some(percent), _, _) => session.set_percentage(percent)?,
        (None, Some(width), Some(height)) => session.resize(width, height)?,
        (None, Some(width), None) => session.set_width(width)?,
        (None, None, Some(height)) => session.set_height(height)?,
        (None, None, None) => return Err("give --width, --height or --percent".into()),
    };
    output::print_notice(&notice);
    save_artifact(&mut session, args.output.as_deref())
}

fn convert(config: &ToolConfig, args: ConvertArgs) -> CommandResult {
    let format = resolve_format(config, args.to.as_deref())?;
    let mut session = open_session(config, &args.input)?;

    let notice = match args.quality {
        Some(q) => session.apply(&TargetSpec::new(format).with_quality(Quality::new(q)))?,
        None => session.convert(format)?,
    };
    output::print_notice(&notice);
    save_artifact(&mut session, args.output.as_deref())
}

fn run_batch(config: &ToolConfig, args: BatchArgs) -> CommandResult {
    let format = resolve_format(config, args.to.as_deref())?;
    let mut spec = TargetSpec::new(format);
    spec.width = args.width;
    spec.height = args.height;
    spec.quality = args.quality.map(Quality::new);

    let job = BatchJob {
        out_dir: args.out_dir,
        spec,
        aspect_lock: config.resize.aspect_lock,
    };

    init_thread_pool(&config.processing);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = batch::run_batch(&args.inputs, &job, &config.transform_settings(), Some(tx));
    printer.join().ok();
    let report = result?;

    output::print_batch_summary(&report);
    if let Some(path) = &args.report {
        batch::write_report(&report, path)?;
    }
    if report.has_failures() {
        return Err(format!("{} of {} files failed", report.failed, report.entries.len()).into());
    }
    Ok(())
}

/// `--to` when given, otherwise the configured default format.
fn resolve_format(config: &ToolConfig, to: Option<&str>) -> Result<TargetFormat, Box<dyn Error>> {
    match to {
        Some(name) => Ok(TargetFormat::parse(name)?),
        None => Ok(config.output.format),
    }
}

/// Write the session's artifact; a same-format no-op writes nothing.
fn save_artifact(session: &mut Session, output: Option<&Path>) -> CommandResult {
    let Some(Artifact {
        image, file_name, ..
    }) = session.take_artifact()
    else {
        return Ok(());
    };
    let path = output.map_or_else(|| PathBuf::from(&file_name), Path::to_path_buf);
    std::fs::write(&path, image.bytes())?;
    output::print_saved(&path, image.dimensions(), image.len());
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
