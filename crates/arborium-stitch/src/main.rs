//! arborium-stitch CLI - put highlighted code blocks into rendered site output.

use std::fs;
use std::path::{Path, PathBuf};

use arborium_stitch::{
    Block, CONFIG_FILE, Config, Error, Registry, Result, StitchOptions, Stitcher, check_leftovers,
};
use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

/// Stitch highlighted code blocks into static-site output
#[derive(Debug, Facet)]
struct Args {
    #[facet(args::subcommand)]
    command: Command,
}

/// Available commands
#[derive(Debug, Facet)]
#[repr(u8)]
#[allow(dead_code)] // variants used by facet_args derive
enum Command {
    /// Print version information
    Version,

    /// Replace placeholders in an output directory with highlighted blocks
    Apply {
        /// Rendered site directory, rewritten in place
        #[facet(args::positional)]
        output: PathBuf,

        /// JSON list of highlighted blocks
        #[facet(args::named, args::short = 'b')]
        blocks: PathBuf,

        /// Config file (defaults to ./arborium-stitch.toml if present)
        #[facet(args::named, args::short = 'c', default)]
        config: Option<PathBuf>,

        /// Show verbose output
        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },

    /// Fail if any placeholder is left in an output directory
    Check {
        /// Rendered site directory
        #[facet(args::positional)]
        output: PathBuf,

        /// Config file (defaults to ./arborium-stitch.toml if present)
        #[facet(args::named, args::short = 'c', default)]
        config: Option<PathBuf>,

        /// Show verbose output
        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },
}

fn main() {
    // Install Miette's graphical error handler for nice CLI diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    }))
    .ok();

    let args: Args = facet_args::from_std_args().unwrap_or_else(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    });

    let result = match args.command {
        Command::Version => {
            println!("arborium-stitch {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Command::Apply {
            output,
            blocks,
            config,
            verbose,
        } => {
            init_tracing(verbose);
            apply(&output, &blocks, config.as_deref())
        }
        Command::Check {
            output,
            config,
            verbose,
        } => {
            init_tracing(verbose);
            check(&output, config.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "arborium_stitch=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_optional(Path::new(CONFIG_FILE)),
    }
}

fn load_blocks(path: &Path) -> Result<Registry> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let blocks: Vec<Block> = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(blocks.into_iter().collect())
}

fn apply(output: &Path, blocks: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let registry = load_blocks(blocks)?;

    eprintln!(
        "{} Stitching {} blocks into {}",
        "arborium-stitch".green().bold(),
        registry.len(),
        output.display()
    );
    eprintln!();

    let stitcher = Stitcher::new(StitchOptions::from_config(output, &config));
    let stats = stitcher.run(&registry)?;

    eprintln!("{}", "Results:".bold());
    eprintln!(
        "  {} files with placeholders",
        stats.candidate_files.to_string().cyan()
    );
    eprintln!(
        "  {} code blocks replaced",
        stats.blocks_replaced.to_string().green()
    );
    if stats.component_files > 0 {
        eprintln!(
            "  {} component pages rendered",
            stats.component_files.to_string().green()
        );
    }
    if stats.unknown_placeholders > 0 {
        eprintln!(
            "  {} placeholders without a registered block",
            stats.unknown_placeholders.to_string().yellow()
        );
    }
    eprintln!(
        "  {} files written",
        stats.files_written.len().to_string().cyan()
    );
    eprintln!();
    eprintln!(
        "{} in {:.2}s",
        "Completed".green().bold(),
        stats.duration.as_secs_f64()
    );

    Ok(())
}

fn check(output: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    check_leftovers(output, &config.ignore_leftover_ids)?;
    eprintln!(
        "{} No unrendered blocks in {}",
        "✓".green(),
        output.display()
    );
    Ok(())
}
