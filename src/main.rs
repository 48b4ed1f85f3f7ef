//! disklru command-line tool
//!
//! Inspect and manipulate a disk cache directory.
//!
//! ```text
//! disklru --dir /var/cache/app put thumb-1 ./thumb.png --files
//! disklru --dir /var/cache/app get thumb-1 > thumb.png
//! disklru --dir /var/cache/app stats --json
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use disklru::{CacheConfig, DiskLruCache};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// =============================================================================
// CLI Arguments
// =============================================================================

/// disklru - journaled disk LRU cache tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache directory
    #[arg(long, env = "DISKLRU_DIR")]
    dir: PathBuf,

    /// Application version recorded in the journal
    #[arg(long, env = "DISKLRU_APP_VERSION", default_value = "1")]
    app_version: u32,

    /// Values per entry
    #[arg(long, env = "DISKLRU_VALUE_COUNT", default_value = "1")]
    value_count: usize,

    /// Maximum total bytes
    #[arg(long, env = "DISKLRU_MAX_SIZE", default_value = "52428800")]
    max_size: u64,

    /// Maximum number of value files
    #[arg(long, env = "DISKLRU_MAX_FILE_COUNT", default_value = "10000")]
    max_file_count: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store one value per slot under a key
    Put {
        key: String,
        values: Vec<String>,
        /// Treat values as paths to read from
        #[arg(long)]
        files: bool,
    },
    /// Write a stored value to stdout
    Get {
        key: String,
        #[arg(long, default_value = "0")]
        index: usize,
    },
    /// Remove a key
    Remove { key: String },
    /// Print size, counts and bounds
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Trim to the bounds and flush the journal
    Flush,
    /// Delete every entry and the directory itself
    Clear,
}

impl Args {
    fn config(&self) -> CacheConfig {
        CacheConfig {
            directory: self.dir.clone(),
            app_version: self.app_version,
            value_count: self.value_count,
            max_size: self.max_size,
            max_file_count: self.max_file_count,
        }
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let cache = DiskLruCache::with_config(args.config())
        .with_context(|| format!("opening cache at {}", args.dir.display()))?;
    debug!(dir = %args.dir.display(), "cache opened");

    let result = run(&cache, &args.command, args.value_count);
    let closed = match args.command {
        Command::Clear => Ok(()),
        _ => cache.close().context("closing cache"),
    };
    result.and(closed)
}

fn run(cache: &DiskLruCache, command: &Command, value_count: usize) -> Result<()> {
    match command {
        Command::Put { key, values, files } => {
            if values.len() != value_count {
                bail!("expected {} values, got {}", value_count, values.len());
            }
            let mut editor = match cache.edit(key)? {
                Some(editor) => editor,
                None => bail!("{} is being edited", key),
            };
            for (index, value) in values.iter().enumerate() {
                if *files {
                    let bytes =
                        std::fs::read(value).with_context(|| format!("reading {}", value))?;
                    editor.set(index, bytes)?;
                } else {
                    editor.set(index, value)?;
                }
            }
            editor.commit()?;
        }
        Command::Get { key, index } => {
            let mut snapshot = match cache.get(key)? {
                Some(snapshot) => snapshot,
                None => bail!("{} not found", key),
            };
            let value = snapshot.bytes(*index)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&value)?;
            stdout.flush()?;
        }
        Command::Remove { key } => {
            if !cache.remove(key)? {
                bail!("{} not found or being edited", key);
            }
        }
        Command::Stats { json } => {
            let stats = cache.stats();
            if *json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("entries:        {}", stats.entries);
                println!("size:           {} / {}", stats.size, stats.max_size);
                println!("files:          {} / {}", stats.file_count, stats.max_file_count);
                println!("redundant ops:  {}", stats.redundant_op_count);
            }
        }
        Command::Flush => cache.flush()?,
        Command::Clear => cache.delete()?,
    }
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so `get` output stays clean.
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
