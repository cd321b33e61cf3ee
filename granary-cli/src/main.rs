use clap::{Parser, Subcommand};
use granary::{Config, Database, Repository};
use std::path::Path;
use std::process;

/// Granary CLI — validate content files and build the dataset artifact
#[derive(Parser)]
#[command(name = "granary", version, about)]
struct Cli {
    /// Path to the build configuration file
    #[arg(long, default_value = granary::config::DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and build your data
    Build {
        /// Enforce referential integrity
        #[arg(short = 'i', long)]
        referential_integrity: bool,
    },

    /// Manage a schema repository
    Repo {
        /// Repository root directory
        #[arg(long, default_value = "repository")]
        root: String,

        /// Repository namespace
        #[arg(long, default_value = "schemas.local")]
        namespace: String,

        /// Output directory name inside the root
        #[arg(long, default_value = "_build")]
        output: String,

        #[command(subcommand)]
        command: RepoCommand,
    },
}

#[derive(Subcommand)]
enum RepoCommand {
    /// Create a new repository root
    Init,

    /// Add a schema (scaffolds version v1)
    AddSchema {
        /// Schema name
        name: String,
    },

    /// Add a new version to an existing schema
    AddVersion {
        /// Schema name
        name: String,
    },

    /// Emit the repository manifest
    Build,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build {
            referential_integrity,
        } => build(&cli.config, referential_integrity),
        Command::Repo {
            root,
            namespace,
            output,
            command,
        } => repo(&root, &namespace, &output, command),
    }
}

fn build(
    config_path: &str,
    referential_integrity: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(Path::new(config_path))?;
    let mut db = Database::open(config);

    println!("Registering schemas");
    db.register_schema_dir()?;

    println!("Validating data");
    let report = db.build()?;

    let mut failed = false;
    if report.is_ok() {
        println!("Validations complete ({} records)", report.inserted());
    } else {
        // Every accumulated error is reported before we decide anything
        for err in report.errors() {
            eprintln!("  - {err}");
        }
        eprintln!("Validations failed");
        failed = true;
    }

    if referential_integrity {
        println!("Checking referential integrity");
        match db.check_references() {
            Ok(()) => println!("References validated"),
            Err(e) => {
                eprintln!("{e}");
                failed = true;
            }
        }
    }

    if failed {
        return Err("build failed".into());
    }

    println!("Creating output file");
    let path = granary::output::write_artifact(&db)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn repo(
    root: &str,
    namespace: &str,
    output: &str,
    command: RepoCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = Path::new(root);

    match command {
        RepoCommand::Init => {
            Repository::create(root, namespace, output)?;
            println!("Initialized repository at {}", root.display());
        }
        RepoCommand::AddSchema { name } => {
            let mut repo = Repository::open(root, namespace, output)?;
            repo.add_schema(&name)?;
            println!("Added schema '{name}' (v1)");
        }
        RepoCommand::AddVersion { name } => {
            let mut repo = Repository::open(root, namespace, output)?;
            repo.add_version(&name)?;
            println!("Added new version of schema '{name}'");
        }
        RepoCommand::Build => {
            let repo = Repository::open(root, namespace, output)?;
            let path = repo.build()?;
            println!("Manifest written to {}", path.display());
        }
    }

    Ok(())
}
