use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, Level};

use yolo_frame_sampler::core::ExistingFiles;
use yolo_frame_sampler::logging::{setup_console_logging, setup_logging};
use yolo_frame_sampler::state::Settings;
use yolo_frame_sampler::{
    analyze_dataset_with_options, list_video_folders, AppConfig, ConflictResolution,
    ResolutionSampling, SamplerError, SamplerResult, SamplingJob, SamplingObserver,
    SamplingOutcome, SamplingRequest,
};

/// Sample image/label pairs from per-video YOLO datasets
#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Cli {
    /// JSON configuration file overriding the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for log files
    #[arg(long = "log-dir", global = true, default_value = "logs")]
    log_dir: PathBuf,

    /// Also write the detailed log to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the video folders under an input root
    Folders {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Compute dataset statistics over every video folder
    Analyze {
        #[arg(short, long)]
        input: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,

        /// Read the resolution of every image instead of a sample
        #[arg(long)]
        exhaustive: bool,
    },
    /// Randomly sample pairs and copy them to an output folder
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Input root; defaults to the last one used
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output root; defaults to the last one used
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Video folders to sample from; defaults to all of them
    #[arg(long, value_delimiter = ',')]
    folders: Vec<String>,

    /// Number of pairs to sample
    #[arg(long)]
    size: Option<usize>,

    /// Seed for the random draw
    #[arg(long)]
    seed: Option<u64>,

    /// What to do when the output already holds files
    #[arg(long = "on-conflict", value_enum, default_value_t = ConflictChoice::Ask)]
    on_conflict: ConflictChoice,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ConflictChoice {
    Ask,
    Purge,
    Keep,
    Abort,
}

/// Prints host-facing lines to stdout and a throttled progress counter
struct ConsoleObserver;

impl SamplingObserver for ConsoleObserver {
    fn on_log(&mut self, level: Level, message: &str) {
        if level <= Level::INFO {
            println!("{}", message);
        }
    }

    fn on_progress(&mut self, completed: usize, total: usize) {
        if completed % 10 == 0 || completed == total {
            println!("  copied {}/{}", completed, total);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli.log_dir, cli.verbose) {
        setup_console_logging();
        error!("Could not open log file in {:?}: {}", cli.log_dir, e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_configuration() => {
            error!("Invalid input: {}", e);
            eprintln!("Invalid input: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> SamplerResult<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Folders { input } => {
            for folder in list_video_folders(&input)? {
                println!("{}", folder.name);
            }
            Ok(())
        }
        Command::Analyze {
            input,
            json,
            exhaustive,
        } => {
            let mut options = config.analysis_options();
            if exhaustive {
                options.resolution_sampling = ResolutionSampling::exhaustive();
            }
            let stats = analyze_dataset_with_options(&input, &options, &mut ConsoleObserver)?;
            if json {
                let rendered = serde_json::to_string_pretty(&stats)?;
                println!("{}", rendered);
            } else {
                for line in stats.summary_lines() {
                    println!("{}", line);
                }
            }
            Ok(())
        }
        Command::Sample(args) => run_sample(args, &config),
    }
}

fn run_sample(args: SampleArgs, config: &AppConfig) -> SamplerResult<()> {
    let mut settings = Settings::load();

    let input = args
        .input
        .or_else(|| settings.last_input_path.clone())
        .unwrap_or_default();
    let output = args
        .output
        .or_else(|| settings.last_output_path.clone())
        .unwrap_or_default();
    let size = args
        .size
        .or(settings.last_sample_size)
        .unwrap_or(config.default_sample_size);
    let seed = args.seed.or(settings.last_seed).unwrap_or(config.default_seed);

    let folders = if args.folders.is_empty() && input.is_dir() {
        list_video_folders(&input)?
            .into_iter()
            .map(|folder| folder.name)
            .collect()
    } else {
        args.folders
    };

    let job = SamplingJob::new(SamplingRequest::new(&input, folders, size, seed), &output)
        .with_config(config);

    let mut observer = ConsoleObserver;
    let plan = job.plan(&mut observer)?;

    let resolution = if plan.has_conflicts() {
        match args.on_conflict {
            ConflictChoice::Ask => ask_resolution(&plan.existing)?,
            ConflictChoice::Purge => ConflictResolution::Purge,
            ConflictChoice::Keep => ConflictResolution::KeepAndOverwrite,
            ConflictChoice::Abort => ConflictResolution::Abort,
        }
    } else {
        ConflictResolution::KeepAndOverwrite
    };

    let outcome = plan.execute(resolution, &mut observer)?;

    if let SamplingOutcome::Completed { .. } = outcome {
        settings.last_input_path = Some(input);
        settings.last_output_path = Some(output);
        settings.last_sample_size = Some(size);
        settings.last_seed = Some(seed);
        settings.save();
    }
    Ok(())
}

fn ask_resolution(existing: &ExistingFiles) -> SamplerResult<ConflictResolution> {
    println!("The output folders already contain files:");
    println!("- {} image(s)", existing.images.len());
    println!("- {} label(s)", existing.labels.len());
    println!();
    println!("  y: Delete all existing files and start fresh");
    println!("  n: Keep existing files (may overwrite files with same names)");
    println!("  c: Abort sampling operation");
    print!("Delete all existing files before sampling? [y/n/c] ");
    io::stdout()
        .flush()
        .map_err(|e| SamplerError::io("<stdout>", e))?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| SamplerError::io("<stdin>", e))?;

    Ok(parse_answer(&answer))
}

fn parse_answer(answer: &str) -> ConflictResolution {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => ConflictResolution::Purge,
        "n" | "no" => ConflictResolution::KeepAndOverwrite,
        _ => ConflictResolution::Abort,
    }
}
