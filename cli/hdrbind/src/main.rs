//! hdrbind CLI: generate foreign-function bindings from C headers.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use hdrbind_gen::EnumMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hdrbind", version, about = "Generate bindings from C headers")]
struct Cli {
    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the binding artifact described by a configuration file
    Generate {
        /// Configuration file (.toml or .json)
        config: PathBuf,
        /// Artifact path (default: <name>.py next to the config)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Default library path of the generated handle
        #[arg(long)]
        library: Option<String>,
        /// Enumeration rendering
        #[arg(long, value_enum)]
        enum_mode: Option<EnumModeArg>,
        /// Read the declaration tree from a dump instead of parsing
        #[arg(long)]
        ast: Option<PathBuf>,
        /// Print the artifact instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Analyze a header and report what generation would do
    Check {
        /// Configuration file (.toml or .json)
        config: PathBuf,
        /// Read the declaration tree from a dump instead of parsing
        #[arg(long)]
        ast: Option<PathBuf>,
    },
    /// Parse a header with libclang and dump its declaration tree as JSON
    #[cfg(feature = "libclang")]
    DumpAst {
        /// Header to parse
        header: PathBuf,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Preprocessor arguments
        #[arg(last = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EnumModeArg {
    /// One IntEnum class per enumeration
    Named,
    /// Module-level integer constants
    Flat,
}

impl From<EnumModeArg> for EnumMode {
    fn from(arg: EnumModeArg) -> Self {
        match arg {
            EnumModeArg::Named => EnumMode::Named,
            EnumModeArg::Flat => EnumMode::Flat,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Default log level for the verbosity flags.
fn log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = log_level(verbose, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            config,
            output,
            library,
            enum_mode,
            ast,
            dry_run,
        } => {
            let overrides = commands::generate::Overrides {
                output,
                library,
                enum_mode: enum_mode.map(EnumMode::from),
                ast,
            };
            commands::generate::run(&config, overrides, dry_run)
        }

        Commands::Check { config, ast } => commands::check::run(&config, ast),

        #[cfg(feature = "libclang")]
        Commands::DumpAst {
            header,
            output,
            args,
        } => commands::dump_ast::run(&header, &args, output.as_deref()),
    }
}
