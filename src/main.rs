use anyhow::Result;
use clap::Parser;
use pvmirror::commands;
use std::path::PathBuf;

/// pvmirror - local provider mirror inspector
///
/// Discover plugin provider packages stored in a local directory tree.
///
/// Examples:
///   pvmirror list                               # Every package in the mirror
///   pvmirror versions acme/widget               # Versions of one provider
///   pvmirror show acme/widget 1.2.0             # Package for the current platform
#[derive(Parser, Debug)]
#[command(author, version = env!("PVMIRROR_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mirror root directory (overrides default; also via PVMIRROR_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "PVMIRROR_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List every package in the mirror
    List(ListArgs),

    /// List the versions of one provider
    Versions(VersionsArgs),

    /// Show the package of one provider version
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Print packages as JSON
    #[arg(long)]
    pub json: bool,

    /// Also report mirror entries that were skipped
    #[arg(long)]
    pub diagnostics: bool,
}

#[derive(clap::Args, Debug)]
pub struct VersionsArgs {
    /// Provider address: [HOSTNAME/]NAMESPACE/TYPE
    #[arg(value_name = "PROVIDER")]
    pub provider: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Provider address: [HOSTNAME/]NAMESPACE/TYPE
    #[arg(value_name = "PROVIDER")]
    pub provider: String,

    /// Exact version, e.g. 1.2.0
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Target platform as OS_ARCH (defaults to the current platform)
    #[arg(long, short = 'p', value_name = "OS_ARCH")]
    pub platform: Option<String>,

    /// Print the package as JSON
    #[arg(long)]
    pub json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = pvmirror::runtime::RealRuntime;

    match cli.command {
        Commands::List(args) => commands::list(runtime, cli.root, args.json, args.diagnostics)?,
        Commands::Versions(args) => commands::versions(runtime, cli.root, &args.provider)?,
        Commands::Show(args) => commands::show(
            runtime,
            cli.root,
            &args.provider,
            &args.version,
            args.platform.as_deref(),
            args.json,
        )?,
    }
    Ok(())
}
