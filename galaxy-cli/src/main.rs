//! galaxy-sync CLI
//!
//! Keeps a local JSON dataset in sync with the stars published on the
//! Factorio galaxy page.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use galaxy_catalog::load_catalog;
use galaxy_scraper::GalaxyClient;
use galaxy_sync::{CheckpointWriter, SyncEvent, SyncOptions, sync_stars};

#[derive(Parser)]
#[command(name = "galaxy-sync")]
#[command(about = "Track the stars on the Factorio galaxy page", long_about = None)]
struct Cli {
    /// Path to the JSON data file
    #[arg(short, long, global = true, default_value = "data.json")]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the current star listing and sync details into the data file
    Sync {
        /// Maximum detail fetches this run
        #[arg(short, long)]
        limit: Option<usize>,

        /// Concurrent detail fetches
        #[arg(long, default_value_t = galaxy_sync::MAX_CONCURRENT_FETCHES)]
        workers: usize,

        /// Update the star listing only, without fetching details
        #[arg(long)]
        skip_details: bool,

        /// Show what would be fetched without fetching or writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Base URL of the galaxy site
        #[arg(long, default_value = "https://factorio.com")]
        base_url: String,
    },

    /// Print statistics about the local data file
    Stats,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            limit,
            workers,
            skip_details,
            dry_run,
            base_url,
        } => run_sync(cli.data_file, limit, workers, skip_details, dry_run, &base_url),
        Commands::Stats => run_stats(cli.data_file),
    }
}

fn run_sync(
    data_file: PathBuf,
    limit: Option<usize>,
    workers: usize,
    skip_details: bool,
    dry_run: bool,
    base_url: &str,
) -> ExitCode {
    let client = match GalaxyClient::with_base_url(base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            return ExitCode::FAILURE;
        }
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("/-\\|"),
        );
        pb.set_message("Fetching the galaxy page...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        // The one unrecoverable failure: without the listing there is no run.
        let listing = match galaxy_scraper::find_star_listing(&client).await {
            Ok(listing) => listing,
            Err(e) => {
                pb.finish_and_clear();
                eprintln!(
                    "{} Failed to fetch the star listing: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    e,
                );
                return ExitCode::FAILURE;
            }
        };
        pb.finish_and_clear();

        println!(
            "{} Fetched listing: {} stars",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            listing.len(),
        );

        let catalog = load_catalog(&data_file);
        println!(
            "Loaded {} stars ({} with details) from {}",
            catalog.len(),
            catalog.detailed_count(),
            data_file.display().if_supports_color(Stdout, |t| t.dimmed()),
        );

        if dry_run {
            let plan = galaxy_sync::plan_sync(&catalog, &listing);
            if plan.is_empty() {
                println!("Catalog is up to date; nothing to do.");
            } else {
                println!(
                    "Would add {} stars and fetch details for {} ({} new, {} pending).",
                    plan.new_stars.len(),
                    plan.work.len(),
                    plan.work.len() - plan.pending,
                    plan.pending,
                );
            }
            return ExitCode::SUCCESS;
        }

        let checkpoint = CheckpointWriter::new(&data_file);
        let options = SyncOptions {
            max_concurrent: workers.max(1),
            limit,
            skip_details,
            ..Default::default()
        };

        let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<SyncEvent>();

        let sync_future = sync_stars(
            Arc::new(client),
            catalog,
            &listing,
            &checkpoint,
            &options,
            event_tx,
        );
        tokio::pin!(sync_future);

        let mut bar: Option<ProgressBar> = None;
        let mut result = None;

        // Drive the pipeline while rendering its events; the channel closes
        // when the pipeline returns and drops its sender.
        loop {
            tokio::select! {
                r = &mut sync_future, if result.is_none() => {
                    result = Some(r);
                }
                event = event_rx.recv() => {
                    let Some(event) = event else { break };
                    handle_event(event, &mut bar, limit);
                }
            }
        }

        // Channel closed before completion is unusual but safe: finish the
        // pipeline directly.
        if result.is_none() {
            let _ = sync_future.await;
        }

        if let Some(b) = &bar {
            b.finish_and_clear();
        }

        println!(
            "Last update: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        );
        ExitCode::SUCCESS
    })
}

fn handle_event(event: SyncEvent, bar: &mut Option<ProgressBar>, limit: Option<usize>) {
    match event {
        SyncEvent::ListingDiffed {
            new,
            pending,
            to_fetch,
            ..
        } => {
            println!("{} new stars, {} awaiting details", new, pending);
            let total = limit.map_or(to_fetch, |l| to_fetch.min(l));
            if total > 0 {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    ProgressStyle::with_template(
                        "  {bar:40.cyan/blue} {pos:>5}/{len:5} {msg}",
                    )
                    .unwrap()
                    .progress_chars("##-"),
                );
                *bar = Some(pb);
            }
        }
        SyncEvent::NothingToDo => {
            println!("Catalog is up to date; data file untouched.");
        }
        SyncEvent::BatchStarted { batch, batches, size } => {
            if let Some(pb) = bar {
                pb.set_message(format!("batch {}/{} ({} stars)", batch, batches, size));
            }
        }
        SyncEvent::StarResolved { name, .. } => {
            if let Some(pb) = bar {
                pb.inc(1);
                pb.set_message(name);
            }
        }
        SyncEvent::StarUnavailable { name, .. } => {
            if let Some(pb) = bar {
                pb.println(format!(
                    "  {} no details for {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.yellow()),
                    name,
                ));
                pb.inc(1);
            }
        }
        SyncEvent::CheckpointWritten => {
            log::debug!("Checkpoint written");
        }
        SyncEvent::Done { stats } => {
            if let Some(pb) = bar {
                pb.finish_and_clear();
            }
            println!();
            println!(
                "{}",
                "Sync complete".if_supports_color(Stdout, |t| t.bold()),
            );
            println!("  Stars:         {:>6}", stats.stars_total);
            println!("  With details:  {:>6}", stats.stars_detailed);
            println!("  Added:         {:>6}", stats.stars_added);
            println!("  Processed:     {:>6}", stats.stars_processed);
            println!("  Fetched:       {:>6}", stats.details_fetched);
            if stats.details_unavailable > 0 {
                println!("  Unavailable:   {:>6}", stats.details_unavailable);
            }
        }
    }
}

fn run_stats(data_file: PathBuf) -> ExitCode {
    let catalog = load_catalog(&data_file);
    if catalog.is_empty() {
        println!("No stars in {}", data_file.display());
        return ExitCode::SUCCESS;
    }

    let named = catalog.names.iter().filter(|n| n.is_some()).count();
    let users: HashSet<&str> = catalog
        .users
        .iter()
        .map(String::as_str)
        .filter(|u| !u.is_empty())
        .collect();
    let modded = catalog
        .details
        .iter()
        .flatten()
        .filter(|d| !d.mods.is_empty())
        .count();

    println!(
        "{}",
        format!("Catalog: {}", data_file.display())
            .if_supports_color(Stdout, |t| t.bold()),
    );
    println!("  Stars:         {:>6}", catalog.len());
    println!("  Named:         {:>6}", named);
    println!("  With details:  {:>6}", catalog.detailed_count());
    println!("  Modded saves:  {:>6}", modded);
    println!("  Unique users:  {:>6}", users.len());

    ExitCode::SUCCESS
}
