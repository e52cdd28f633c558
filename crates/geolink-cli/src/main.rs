//! geolink command-line entry point

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use geolink_core::{DEFAULT_AXIS_ORDER, DEFAULT_PACKAGE_NAME, EulerOrder};

/// Map component descriptions between notation files and CAD assemblies
#[derive(Parser)]
#[command(name = "geolink")]
#[command(about = "Component poses for structural notation and Onshape", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the absolute pose of every typed component as JSON
    Poses {
        /// Notation file to read
        file: PathBuf,

        /// Rotation attributes are in degrees
        #[arg(long)]
        degrees: bool,

        /// Euler axis convention (e.g. sxyz, rzyx)
        #[arg(long, default_value = DEFAULT_AXIS_ORDER)]
        order: EulerOrder,

        /// Start from the part with this name instead of the detected root
        #[arg(long)]
        root: Option<String>,
    },

    /// Re-serialize the components of a notation file
    Normalize {
        /// Notation file to read
        file: PathBuf,

        /// Package name of the output
        #[arg(long, default_value = DEFAULT_PACKAGE_NAME)]
        package: String,

        /// Also save the component tree as a project file
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Insert the components of a notation file into an Onshape assembly
    Export {
        /// Notation file to read
        file: PathBuf,

        /// URL of the target assembly
        #[arg(long)]
        target: String,

        /// Rotation attributes are in degrees
        #[arg(long)]
        degrees: bool,

        /// Euler axis convention (e.g. sxyz, rzyx)
        #[arg(long, default_value = DEFAULT_AXIS_ORDER)]
        order: EulerOrder,
    },

    /// Print the world pose of every occurrence in an Onshape assembly
    Occurrences {
        /// URL of the assembly
        target: String,

        /// Euler axis convention for the printed rotations
        #[arg(long, default_value = DEFAULT_AXIS_ORDER)]
        order: EulerOrder,

        /// Print notation text instead of JSON
        #[arg(long)]
        notation: bool,

        /// Name of the wrapper part in notation output
        #[arg(long, default_value = "assembly")]
        root_name: String,
    },

    /// Create an empty assembly in the workspace of a document URL
    CreateAssembly {
        /// Any element URL in the target workspace
        document: String,

        /// Name of the new assembly tab
        #[arg(long)]
        name: String,
    },
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geolink=info,geolink_core=info,geolink_onshape=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Poses {
            file,
            degrees,
            order,
            root,
        } => commands::poses(&file, degrees, order, root.as_deref()),
        Commands::Normalize {
            file,
            package,
            project,
        } => commands::normalize(&file, &package, project.as_deref()),
        Commands::Export {
            file,
            target,
            degrees,
            order,
        } => commands::export(&file, &target, degrees, order),
        Commands::Occurrences {
            target,
            order,
            notation,
            root_name,
        } => {
            let root_name = notation.then_some(root_name.as_str());
            commands::occurrences(&target, order, root_name)
        }
        Commands::CreateAssembly { document, name } => commands::create_assembly(&document, &name),
    }
}
