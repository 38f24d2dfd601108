mod config;
mod library;
mod logging;
mod metadata;
mod musicbrainz;
mod ports;
mod search;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;

use crate::config::Settings;
use crate::library::{FileParent, Library};
use crate::logging::init_tracing;
use crate::metadata::TrackMetadata;
use crate::musicbrainz::MusicBrainzClient;
use crate::ports::library::FileId;
use crate::search::reconciler::ReconciliationContext;
use crate::search::{SearchSession, SessionState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Console log level (default: warn)
    #[arg(long, default_value = "warn", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Maximum number of results to request
    #[arg(long, default_value_t = 25, global = true)]
    limit: u32,

    /// Use advanced query syntax regardless of the saved setting
    #[arg(long, global = true)]
    advanced: bool,

    /// Commit the given result row into a fresh in-memory library and
    /// report where it ended up
    #[arg(long, global = true)]
    pick: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the catalog with a free-text query
    Search {
        /// The query text
        query: String,
    },
    /// Search for recordings similar to a local file's tags
    Similar {
        /// The audio file to match
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let settings = Settings::load()?;
    let advanced = args.advanced || settings.use_advanced_search_syntax;
    let client = Arc::new(MusicBrainzClient::new()?);

    let mut library = Library::new();

    match args.command {
        Commands::Search { query } => {
            let mut session = SearchSession::new(client, advanced);
            session.set_limit(args.limit);
            session.search(&query).await;
            print_session(&session);
            if let Some(row) = args.pick {
                session.choose_row(row, &mut library)?;
                report_pick(&session, row, &library, None);
            }
        }
        Commands::Similar { file } => {
            let metadata = TrackMetadata::from_file(&file)?;
            let file_id = library.add_file(file.display().to_string());
            let context =
                ReconciliationContext::for_file(file_id, library.previous_album_of(file_id));
            let mut session = SearchSession::for_file(client, advanced, metadata, context);
            session.set_limit(args.limit);
            if let Some(query) = session.search_similar().await {
                println!("query: {query}");
            }
            print_session(&session);
            if let Some(row) = args.pick {
                session.choose_row(row, &mut library)?;
                report_pick(&session, row, &library, Some(file_id));
            }
        }
    }

    if advanced != settings.use_advanced_search_syntax {
        let mut settings = settings;
        settings.use_advanced_search_syntax = advanced;
        settings.save()?;
    }

    Ok(())
}

fn report_pick(session: &SearchSession, row: usize, library: &Library, file: Option<FileId>) {
    let Some(record) = session.results().and_then(|results| results.record(row)) else {
        return;
    };

    if let Some(file_id) = file {
        let name = library.file_name(file_id).unwrap_or_default();
        match library.file_parent(file_id) {
            Some(FileParent::Track {
                album,
                recording_id,
            }) => {
                println!("moved {name} onto recording {recording_id} of release {}", album.0);
            }
            Some(FileParent::Standalone { recording_id }) => {
                println!("moved {name} onto standalone recording {recording_id}");
            }
            None => {}
        }
    } else if record.is_standalone() && library.has_standalone_recording(&record.recording_id) {
        println!("loaded standalone recording {}", record.recording_id);
    } else if let Some(release_id) = &record.release_id {
        println!("loaded album for release {release_id}");
    }

    if let (Some(group_id), Some(release_id)) = (&record.release_group_id, &record.release_id)
        && library.is_release_loaded(group_id, release_id)
    {
        println!("release group {group_id} now tracks {release_id}");
    }
}

fn print_session(session: &SearchSession) {
    match session.state() {
        SessionState::Results => {
            let Some(results) = session.results() else {
                return;
            };
            println!(
                "{:<30} {:>6}  {:<25} {:<30} {:<10} {:<8} {}",
                "Name", "Length", "Artist", "Release", "Date", "Country", "Type"
            );
            for record in &results.records {
                println!(
                    "{:<30} {:>6}  {:<25} {:<30} {:<10} {:<8} {}",
                    truncate(&record.title, 30),
                    record.length,
                    truncate(&record.artist, 25),
                    truncate(&record.release, 30),
                    record.date,
                    record.country,
                    record.release_type,
                );
            }
        }
        SessionState::NoResults { message } | SessionState::FetchFailed { message } => {
            println!("{message}");
        }
        SessionState::Idle | SessionState::InFlight => {}
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
