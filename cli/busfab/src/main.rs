//! busfab CLI: generate shared-bus interconnects and register files.

mod commands;
mod project;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use project::Project;

#[derive(Parser)]
#[command(name = "busfab", version, about = "Shared-bus fabric and register-file generator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new fabric project
    Init {
        /// Project directory and fabric name
        name: String,
    },
    /// Validate a description and check the generated logic
    Check {
        /// Description file (default: nearest fabric.toml)
        #[arg(long)]
        input: Option<String>,
    },
    /// Print the planned address map
    Plan {
        /// Description file (default: nearest fabric.toml)
        #[arg(long)]
        input: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Generate the interconnect and register files
    Generate {
        /// Description file (default: nearest fabric.toml)
        #[arg(long)]
        input: Option<String>,
        /// Output directory (default: [output] dir of the description)
        #[arg(long)]
        out: Option<String>,
        /// Emit mode (vhdl, json)
        #[arg(long)]
        emit: Option<String>,
        /// Directory with regfile.vhd / fabric.vhd template overrides
        #[arg(long)]
        template_dir: Option<PathBuf>,
    },
    /// Print the token map of one generated unit
    Inspect {
        /// Unit name, e.g. uart_regs or soc_intercon
        unit: String,
        /// Description file (default: nearest fabric.toml)
        #[arg(long)]
        input: Option<String>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Remove generated files
    Clean {
        /// Output directory (default: [output] dir of the description)
        #[arg(long)]
        out: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Check { input } => {
            let project = load(&cwd, input.as_deref())?;
            commands::check::run(&project)
        }

        Commands::Plan { input, format } => {
            let project = load(&cwd, input.as_deref())?;
            commands::plan::run(&project, format.as_deref())
        }

        Commands::Generate {
            input,
            out,
            emit,
            template_dir,
        } => {
            let project = load(&cwd, input.as_deref())?;
            let out_dir = project.output_dir(&cwd, out.as_deref());
            let template_dir = template_dir.map(|dir| cwd.join(dir));
            commands::generate::run(&project, &out_dir, emit.as_deref(), template_dir.as_deref())
        }

        Commands::Inspect {
            unit,
            input,
            format,
        } => {
            let project = load(&cwd, input.as_deref())?;
            commands::inspect::run(&project, &unit, format.as_deref())
        }

        Commands::Clean { out } => {
            let out_dir = match (Project::find_and_load(&cwd)?, out) {
                (_, Some(out)) => cwd.join(out),
                (Some(project), None) => project.output_dir(&cwd, None),
                (None, None) => cwd.join("hdl"),
            };
            commands::clean::run(&out_dir)
        }
    }
}

fn load(cwd: &Path, input: Option<&str>) -> anyhow::Result<Project> {
    let project = Project::resolve(cwd, input)?;
    debug!(
        path = %project.path.display(),
        slaves = project.description.slaves.len(),
        "loaded description"
    );
    Ok(project)
}
