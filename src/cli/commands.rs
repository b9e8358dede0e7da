use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output;
use crate::filters::{CatalogFilter, FilterOutcome, TimeRange, TimeReference, list_filtered, parse_search_query};
use crate::indexer::{Catalog, build_catalog};
use crate::models::{Conversation, Message};
use crate::resolver::{Resolution, resolve};
use crate::search::{DEFAULT_PAGE_SIZE, SearchOptions, search};
use crate::stats::{WeeklyStats, compute_stats, weekly_breakdown};
use crate::store::{Store, StoreInfo};
use crate::utils::resolve_db_path;

const DEFAULT_WEEKS: u16 = 4;

#[derive(Parser)]
#[command(name = "cursor-history-explorer")]
#[command(version)]
#[command(about = "Browse and search Cursor agent conversation history", long_about = None)]
pub struct Cli {
    /// Path to Cursor's state.vscdb (overrides CURSOR_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Filters shared by every command that reads conversations
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only conversations created at or after this time (e.g. 3d, 2w, 2024-01-31)
    #[arg(long, value_name = "WHEN")]
    pub since: Option<String>,

    /// Only conversations created before this time
    #[arg(long, value_name = "WHEN")]
    pub before: Option<String>,

    /// Include archived conversations
    #[arg(short, long)]
    pub all: bool,

    /// Hide conversations without any message
    #[arg(long)]
    pub skip_empty: bool,
}

impl FilterArgs {
    fn to_filter(&self, reference: &TimeReference) -> Result<CatalogFilter> {
        let range = TimeRange::parse(self.since.as_deref(), self.before.as_deref(), reference)?;
        Ok(CatalogFilter::with_range(range).include_archived(self.all).include_empty(!self.skip_empty))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List conversations, most recent first
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of conversations to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print one conversation, selected by id, id prefix, title or subtitle
    Show {
        query: String,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Find conversations containing every keyword or "quoted phrase"
    Search {
        query: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Also search code diffs
        #[arg(long)]
        search_diffs: bool,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Message count statistics
    Stats {
        #[command(flatten)]
        filter: FilterArgs,

        /// Break down by week instead of overall
        #[arg(long)]
        by_week: bool,

        /// Number of weeks for --by-week
        #[arg(long, default_value_t = DEFAULT_WEEKS, value_parser = clap::value_parser!(u16).range(1..=520))]
        weeks: u16,
    },
    /// Show store location, size and totals
    Info,
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = &cli.command else {
        println!("Use --help for usage information");
        return Ok(ExitCode::SUCCESS);
    };

    let reference = TimeReference::local();
    match command {
        Commands::List { filter, limit } => list(&cli, filter, *limit, &reference),
        Commands::Show { query, filter } => show(&cli, query, filter, &reference),
        Commands::Search { query, filter, search_diffs, page, page_size } => {
            let options = SearchOptions {
                filter: filter.to_filter(&reference)?,
                include_diffs: *search_diffs,
                page: *page,
                page_size: *page_size,
            };
            run_search(&cli, query, &options, &reference)
        }
        Commands::Stats { filter, by_week, weeks } => stats(&cli, filter, *by_week, usize::from(*weeks), &reference),
        Commands::Info => info(&cli),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_store(cli: &Cli) -> Result<Store> {
    let path = resolve_db_path(cli.db.as_deref())?;
    debug!(path = %path.display(), "Opening conversation store");
    Ok(Store::open(&path)?)
}

fn load_catalog(store: &Store) -> Result<Catalog> {
    let catalog = build_catalog(store).context("Failed to load conversations")?;
    if catalog.report.skipped() > 0 {
        eprintln!(
            "Warning: skipped {} malformed record(s); run with --verbose for details",
            catalog.report.skipped()
        );
    }
    Ok(catalog)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn list(cli: &Cli, args: &FilterArgs, limit: Option<usize>, reference: &TimeReference) -> Result<ExitCode> {
    let filter = args.to_filter(reference)?;
    let store = open_store(cli)?;
    let catalog = load_catalog(&store)?;
    let (conversations, outcome) = list_filtered(&catalog.conversations, &filter, limit);

    if cli.json {
        #[derive(Serialize)]
        struct Listing<'a> {
            conversations: &'a [&'a Conversation],
            filter: FilterOutcome,
            skipped_records: usize,
        }
        print_json(&Listing { conversations: &conversations, filter: outcome, skipped_records: catalog.report.skipped() })?;
    } else {
        print!("{}", output::conversation_table(&conversations, reference));
        print!("{}", output::filter_footer(conversations.len(), &outcome));
    }
    Ok(ExitCode::SUCCESS)
}

fn show(cli: &Cli, query: &str, args: &FilterArgs, reference: &TimeReference) -> Result<ExitCode> {
    let filter = args.to_filter(reference)?;
    let store = open_store(cli)?;
    let catalog = load_catalog(&store)?;

    match resolve(&catalog.conversations, query, &filter) {
        Resolution::Found(conversation) => {
            let batch = conversation
                .messages(&store)
                .with_context(|| format!("Failed to load messages for {}", conversation.id))?;
            if cli.json {
                #[derive(Serialize)]
                struct Shown<'a> {
                    conversation: &'a Conversation,
                    messages: &'a [Message],
                    skipped_messages: usize,
                }
                print_json(&Shown { conversation: &conversation, messages: &batch.messages, skipped_messages: batch.skipped })?;
            } else {
                print!("{}", output::conversation_detail(&conversation, &batch, reference));
            }
            Ok(ExitCode::SUCCESS)
        }
        other => {
            if cli.json {
                print_json(&other)?;
            } else {
                eprint!("{}", output::unresolved(query, &other, reference));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_search(cli: &Cli, query: &str, options: &SearchOptions, reference: &TimeReference) -> Result<ExitCode> {
    // Reject bad queries before touching the store
    let query = parse_search_query(query)?;
    let store = open_store(cli)?;
    let catalog = load_catalog(&store)?;
    let results = search(&catalog.conversations, &store, &query, options)?;

    if cli.json {
        print_json(&results)?;
    } else {
        print!("{}", output::search_results(&results, reference));
    }
    Ok(ExitCode::SUCCESS)
}

fn stats(
    cli: &Cli,
    args: &FilterArgs,
    by_week: bool,
    weeks: usize,
    reference: &TimeReference,
) -> Result<ExitCode> {
    let filter = args.to_filter(reference)?;
    let store = open_store(cli)?;
    let catalog = load_catalog(&store)?;

    if by_week {
        let (breakdown, outcome) = weekly_breakdown(&catalog.conversations, &filter, weeks, reference);
        if cli.json {
            #[derive(Serialize)]
            struct Weekly<'a> {
                weeks: &'a [WeeklyStats],
                filter: FilterOutcome,
            }
            print_json(&Weekly { weeks: &breakdown, filter: outcome })?;
        } else {
            print!("{}", output::weekly_stats(&breakdown, reference));
            print!("{}", output::filter_footer(outcome.matched, &outcome));
        }
    } else {
        let report = compute_stats(&catalog.conversations, &filter);
        if cli.json {
            print_json(&report)?;
        } else {
            print!("{}", output::stats_report(&report, reference));
            print!("{}", output::filter_footer(report.filter.matched, &report.filter));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn info(cli: &Cli) -> Result<ExitCode> {
    let store = open_store(cli)?;
    let store_info = store.info()?;
    let catalog = load_catalog(&store)?;
    let totals = output::CatalogTotals::from_catalog(&catalog);

    if cli.json {
        #[derive(Serialize)]
        struct Info<'a> {
            store: &'a StoreInfo,
            totals: &'a output::CatalogTotals,
        }
        print_json(&Info { store: &store_info, totals: &totals })?;
    } else {
        print!("{}", output::store_info(&store_info, &totals));
    }
    Ok(ExitCode::SUCCESS)
}
