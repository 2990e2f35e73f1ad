use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomgen::config::Config;
use atomgen::input;

/// Get the config directory path (~/.config/atomgen/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("atomgen"))
}

/// Atomically write a file using write-to-temp-then-rename.
/// The destination is never left in a partial state.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<()> {
    // Randomized temp filename so a stale or planted file is never reused.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions or disk space",
                temp_path.display()
            )
        })?;

    temp_file.write_all(content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write to temporary file '{}': disk may be full",
            temp_path.display()
        )
    })?;

    temp_file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk: disk may be full",
            temp_path.display()
        )
    })?;

    drop(temp_file);

    // On Windows, rename fails if destination exists
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!(
                "Failed to remove existing '{}' before atomic replace",
                dst.display()
            )
        })?;
    }

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}': check permissions",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "atomgen",
    version,
    about = "Generate an Atom feed from a TOML or JSON feed description"
)]
struct Args {
    /// Feed description (`.json` for JSON, anything else is read as TOML)
    #[arg(value_name = "FEED")]
    feed: PathBuf,

    /// Write the feed here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file (default: ~/.config/atomgen/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not write a feed that fails validation
    #[arg(long)]
    strict: bool,

    /// Only validate the description, do not generate XML
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let feed = input::read_feed(&args.feed)
        .with_context(|| format!("Failed to load feed description '{}'", args.feed.display()))?;

    let errors = feed.validate();
    for error in &errors {
        eprintln!("warning: {}", error);
    }

    if args.check {
        if !errors.is_empty() {
            bail!("Feed has {} validation error(s)", errors.len());
        }
        println!("{}: feed is valid", args.feed.display());
        return Ok(());
    }

    if !errors.is_empty() && (args.strict || config.strict) {
        bail!(
            "Feed has {} validation error(s); not writing it in strict mode",
            errors.len()
        );
    }

    let xml = feed
        .generate_xml_with(&config.xml_options())
        .context("Failed to generate Atom XML")?;

    match &args.output {
        Some(path) => {
            atomic_write(path, &xml)?;
            tracing::info!(path = %path.display(), bytes = xml.len(), "Wrote feed");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&xml)
                .and_then(|()| stdout.write_all(b"\n"))
                .context("Failed to write feed to stdout")?;
        }
    }

    Ok(())
}
