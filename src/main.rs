use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use repetiscan::blacklist::{normalize_token, Blacklist, BlacklistStore, DEFAULT_BLACKLIST_FILE};
use repetiscan::export::{export_csv, format_titles, format_titles_with_artists};
use repetiscan::grouping::ScanControl;
use repetiscan::models::{MatchMode, ScanResult, DEFAULT_MIN_OVERLAP, DEFAULT_THRESHOLD};
use repetiscan::progress::{format_elapsed, Reporter};
use repetiscan::session::Session;

#[derive(Parser)]
#[command(name = "repetiscan", version)]
#[command(about = "Find probable duplicate tracks in a music folder by title similarity")]
struct Args {
    /// Blacklist file with the noise tokens stripped before comparison
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_BLACKLIST_FILE)]
    blacklist: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide progress bars and log progress lines instead
    #[arg(long, global = true)]
    log_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Folder with the audio files to scan
    #[arg(short, long, value_name = "DIR")]
    folder: PathBuf,

    /// Write the groups to a CSV file
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Print the scan result as JSON
    #[arg(long)]
    json: bool,

    /// Fold accents and non-Latin scripts to ASCII before comparing
    #[arg(long)]
    fold_diacritics: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Group titles whose similarity ratio reaches the threshold
    Ratio {
        #[command(flatten)]
        scan: ScanArgs,
        /// Minimum similarity ratio (0.0 to 1.0)
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
        threshold: f64,
    },

    /// Group titles sharing at least N words
    Words {
        #[command(flatten)]
        scan: ScanArgs,
        /// Minimum number of shared words
        #[arg(short, long, default_value_t = DEFAULT_MIN_OVERLAP)]
        min_overlap: usize,
    },

    /// Group identical titles after dropping one artist's tracks
    Artist {
        #[command(flatten)]
        scan: ScanArgs,
        /// Artist whose tracks are left out (substring, case-insensitive)
        #[arg(short, long, default_value = "")]
        exclude: String,
    },

    /// Show or edit the blacklist
    Blacklist {
        #[command(subcommand)]
        action: BlacklistCmd,
    },
}

#[derive(Subcommand)]
enum BlacklistCmd {
    /// List tokens and their state
    List,
    /// Add a new active token
    Add { token: String },
    /// Turn a token on
    Enable { token: String },
    /// Turn a token off
    Disable { token: String },
    /// Delete a token
    Remove { token: String },
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0.0 and 1.0, got {}", value))
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(result: &ScanResult) {
    if result.is_empty() {
        println!("No duplicates found.");
        return;
    }

    println!("Found {} group(s) for {}:", result.groups.len(), result.mode);
    let with_artists = matches!(result.mode, MatchMode::ExcludeArtist { .. });
    for (i, group) in result.groups.iter().enumerate() {
        let line = if with_artists {
            format_titles_with_artists(group)
        } else {
            format_titles(group)
        };
        println!(" Group {}: {}", i + 1, line);
        for track in group.tracks() {
            debug!("   {}", track.path);
        }
    }
}

fn run_scan(store: &BlacklistStore, scan: ScanArgs, mode: MatchMode, reporter: Reporter) -> Result<()> {
    let blacklist = store
        .load()
        .with_context(|| format!("Failed to load blacklist {:?}", store.path()))?;

    let mut session = Session::new(blacklist).with_folder(&scan.folder);
    session.options.fold_diacritics = scan.fold_diacritics;

    let start = Instant::now();
    let control = ScanControl::default().with_reporter(reporter);
    let result = session
        .run(mode, &control)
        .with_context(|| format!("Failed to scan {:?}", scan.folder))?;

    if scan.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_result(result);
        println!("Elapsed: {}", format_elapsed(start.elapsed()));
    }

    if let Some(path) = scan.export {
        export_csv(&result.groups, &path).with_context(|| format!("Failed to export to {:?}", path))?;
        println!("Exported {} group(s) to {:?}", result.groups.len(), path);
    }

    Ok(())
}

fn run_blacklist(store: &BlacklistStore, action: BlacklistCmd) -> Result<()> {
    let blacklist = store
        .load()
        .with_context(|| format!("Failed to load blacklist {:?}", store.path()))?;

    let updated = match action {
        BlacklistCmd::List => {
            for (token, active) in blacklist.iter() {
                println!("[{}] {}", if active { "x" } else { " " }, token);
            }
            return Ok(());
        }
        BlacklistCmd::Add { token } => {
            if normalize_token(&token).is_empty() {
                bail!("Token cannot be empty");
            }
            blacklist.add_token(&token)
        }
        BlacklistCmd::Enable { token } => set_existing(blacklist, &token, true)?,
        BlacklistCmd::Disable { token } => set_existing(blacklist, &token, false)?,
        BlacklistCmd::Remove { token } => blacklist.remove_token(&token),
    };

    store
        .save(&updated)
        .with_context(|| format!("Failed to save blacklist {:?}", store.path()))?;
    println!("Saved {} token(s) to {:?}", updated.len(), store.path());
    Ok(())
}

fn set_existing(blacklist: Blacklist, token: &str, active: bool) -> Result<Blacklist> {
    if !blacklist.contains(token) {
        bail!("Unknown token '{}'", normalize_token(token));
    }
    Ok(blacklist.set_active(token, active))
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);
    let reporter = Reporter::new(args.log_only);

    let store = BlacklistStore::new(&args.blacklist);

    match args.command {
        Command::Ratio { scan, threshold } => run_scan(&store, scan, MatchMode::Ratio { threshold }, reporter),
        Command::Words { scan, min_overlap } => run_scan(&store, scan, MatchMode::Words { min_overlap }, reporter),
        Command::Artist { scan, exclude } => run_scan(&store, scan, MatchMode::ExcludeArtist { artist: exclude }, reporter),
        Command::Blacklist { action } => run_blacklist(&store, action),
    }
}
