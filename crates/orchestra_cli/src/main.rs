//! Orchestra CLI: the command-line front end of the Wishbone SoC linker.
//!
//! Provides `orchestra init` to scaffold a project, `orchestra check` to
//! validate it, `orchestra compile` to generate the VHDL output, component
//! editing under `orchestra component`, and the inspection helpers
//! `classify`, `entity` and `arbiter`.

#![warn(missing_docs)]

mod arbiter;
mod check;
mod compile;
mod component;
mod init;
mod inspect;
mod session;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Orchestra: links Wishbone components into a system-on-chip.
#[derive(Parser, Debug)]
#[command(name = "orchestra", version, about = "Wishbone SoC linker and interconnect generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to the `project.toml` file or its directory.
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Component library directory (default: `components/` next to the project).
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Check the project and print the report.
    Check(CheckArgs),
    /// Check the project and generate its VHDL files.
    Compile(CompileArgs),
    /// Show how port names are classified into interfaces and roles.
    Classify {
        /// Port names to classify.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Parse a VHDL file and print its first entity.
    Entity {
        /// The VHDL source file.
        file: PathBuf,
    },
    /// Edit or check a library component.
    #[command(subcommand)]
    Component(ComponentCommand),
    /// Write a standalone round-robin arbiter.
    Arbiter(ArbiterArgs),
}

/// Arguments for the `orchestra check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Output format for the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `orchestra compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Output directory (default: `build/` next to the project).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Empty the output directory first.
    #[arg(long)]
    pub clean: bool,
}

/// Component subcommands.
#[derive(Subcommand, Debug)]
pub enum ComponentCommand {
    /// Check a component and print its interfaces.
    Check {
        /// Component name in the library, or its directory.
        component: String,
    },
    /// Add an HDL file to a component, creating the component if needed.
    AddHdl {
        /// Component name in the library, or its directory.
        component: String,
        /// The HDL file to copy in.
        file: PathBuf,
        /// Synthesis/simulation scope of the file.
        #[arg(long, default_value = "all")]
        scope: String,
        /// 1-based load position; appends by default.
        #[arg(long, default_value_t = 0)]
        order: u32,
        /// Make the file the component's top.
        #[arg(long)]
        top: bool,
    },
    /// Remove an HDL file from a component.
    RemoveHdl {
        /// Component name in the library, or its directory.
        component: String,
        /// The file name inside the component.
        name: String,
    },
    /// Designate the top HDL file of a component.
    SetTop {
        /// Component name in the library, or its directory.
        component: String,
        /// The file name inside the component.
        name: String,
    },
}

/// Arguments for the `orchestra arbiter` subcommand.
#[derive(Parser, Debug)]
pub struct ArbiterArgs {
    /// Number of masters.
    #[arg(short, long)]
    pub masters: usize,

    /// Output file (default: standard output).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Log verbosity level.
    pub verbose: u8,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to the project file or directory.
    pub project: Option<PathBuf>,
    /// Optional component library directory.
    pub library: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        project: cli.project,
        library: cli.library,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Init { name } => init::run(name, &global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Classify { ref names } => inspect::classify(names),
        Command::Entity { ref file } => inspect::entity(file),
        Command::Component(ref command) => component::run(command, &global),
        Command::Arbiter(ref args) => arbiter::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// The log level selected by `--quiet` and the `-v` count.
fn log_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over the
/// command-line verbosity.
fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(global)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .with_target(false)
        .try_init();
}
