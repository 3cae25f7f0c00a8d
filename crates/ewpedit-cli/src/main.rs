use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ewpedit::{Edit, Error as EditError};

mod prompt;

use prompt::Prompt;

#[derive(Debug, Parser)]
#[command(
    name = "ewpedit",
    version,
    about = "Add a source file to an IAR Embedded Workbench project (.ewp)"
)]
struct Args {
    /// The EWP file (asked for when omitted)
    #[arg(long, value_name = "EWP")]
    ewp: Option<PathBuf>,
    /// The new file to include in the project (asked for when omitted)
    #[arg(long, value_name = "FILE")]
    file: Option<String>,
    /// Add the file even if it does not exist on disk, without asking
    #[arg(short, long)]
    yes: bool,
    /// Print the updated project to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,
    /// Show debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    debug!("Parsed CLI arguments: {args:?}");

    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());
    run(args, &mut prompt)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn run<R: BufRead, W: Write>(args: Args, prompt: &mut Prompt<R, W>) -> Result<()> {
    let ewp = match args.ewp {
        Some(path) => path,
        None => PathBuf::from(
            prompt
                .ask("Specify EWP file path: ")
                .context("Error obtaining EWP path")?,
        ),
    };
    check_ewp(&ewp)?;

    let file = match args.file {
        Some(file) => file.trim().to_string(),
        None => prompt
            .ask("Specify new file to include in EWP: ")
            .context("Error obtaining file path")?,
    };
    if file.is_empty() {
        bail!("no file to add");
    }

    if !Path::new(&file).exists() {
        if args.yes {
            warn!("file {file} not found, adding anyway");
        } else {
            let question = format!("Warning: file {file} not found. Continue to add? (y): ");
            if !prompt
                .confirm(&question)
                .context("Error obtaining user confirmation")?
            {
                prompt.say(&format!("Not adding {file}"))?;
                return Ok(());
            }
        }
    }

    let original = fs::read(&ewp)
        .with_context(|| format!("Error opening ewp file: {}", ewp.display()))?;

    match ewpedit::add_file(&original, &file) {
        Ok(Edit::Unchanged) => {
            prompt.say(&format!(
                "{} already contains {file}. Not adding {file}.",
                ewp.display()
            ))?;
        }
        Ok(Edit::Inserted(bytes)) if args.dry_run => {
            prompt.emit(&bytes)?;
        }
        Ok(Edit::Inserted(bytes)) => {
            fs::write(&ewp, &bytes)
                .with_context(|| format!("failed to write EWP file {}", ewp.display()))?;
            info!("added {file} to {}", ewp.display());
        }
        Err(EditError::Parse(err)) => {
            return Err(err)
                .with_context(|| format!("Error unmarshalling EWP file {}", ewp.display()));
        }
        Err(EditError::Serialize(err)) => {
            return Err(err).context("Error reconstructing EWP. Original EWP is not modified.");
        }
    }

    Ok(())
}

fn check_ewp(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Error locating EWP file {}", path.display()))?;
    if !metadata.is_file() {
        bail!("Error locating EWP file {}: not a file", path.display());
    }
    if metadata.permissions().readonly() {
        bail!("Error: EWP file {} is not read/write", path.display());
    }
    Ok(())
}
