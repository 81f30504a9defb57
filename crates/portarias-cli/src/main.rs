//! `portarias`: browse, filter and export IPHAN authorization records.

mod config;
mod display;

use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use portarias_core::dates::format_brasilia;
use portarias_core::filter::{facet_options, status_counts};
use portarias_core::{
    ExportError, Facet, FacetValue, FilterState, Record, Session, Status, StatusLabels,
};
use portarias_sync::http::DEFAULT_TABLE;
use portarias_sync::{RecordSource, SnapshotSource, SupabaseClient};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "portarias", version)]
#[command(about = "Search, filter and export IPHAN archaeological research authorizations")]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read records from a local JSON snapshot instead of Supabase
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL", global = true)]
    supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Table holding the records
    #[arg(long, env = "PORTARIAS_TABLE", global = true)]
    table: Option<String>,

    /// Evaluate statuses as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Most recently published authorizations still in force
    Recent {
        /// Every current record from the latest publication day
        #[arg(long)]
        more: bool,
    },
    /// Search and filter, one page at a time
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
        /// Comma-separated column ids
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },
    /// Every field of one record
    Show { id: i64 },
    /// Write the filtered records as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Export the whole snapshot, ignoring filters
        #[arg(long)]
        all: bool,
        /// Comma-separated column ids
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Available columns
    Columns,
    /// Values a facet can be filtered on
    Facets {
        #[arg(value_enum)]
        facet: FacetArg,
    },
    /// When the table was last updated
    Updated,
}

#[derive(Args, Debug, Default, Clone)]
struct FilterArgs {
    /// Accent- and case-insensitive text search
    #[arg(short, long)]
    query: Option<String>,
    /// Year (NULL for records without one)
    #[arg(long)]
    year: Option<String>,
    /// Portaria title (NULL for records without one)
    #[arg(long)]
    title: Option<String>,
    /// Authorization type (NULL for records without one)
    #[arg(long = "type")]
    kind: Option<String>,
    /// Governing regulation (NULL for records without one)
    #[arg(long)]
    regulation: Option<String>,
    /// Status key or label, e.g. `expired` or `Vigente`
    #[arg(long)]
    status: Option<String>,
}

impl FilterArgs {
    fn to_state(&self, labels: &StatusLabels) -> anyhow::Result<FilterState> {
        let facet = |v: &Option<String>| v.as_deref().map(FacetValue::parse);
        let status = self
            .status
            .as_deref()
            .map(|s| Status::parse_with(s, labels))
            .transpose()
            .context("invalid --status")?;
        Ok(FilterState {
            query: self.query.clone(),
            year: facet(&self.year),
            title: facet(&self.title),
            kind: facet(&self.kind),
            regulation: facet(&self.regulation),
            status,
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FacetArg {
    Year,
    Title,
    Type,
    Regulation,
    Status,
}

impl FacetArg {
    /// Field facet behind this choice; `None` for the computed status.
    fn facet(self) -> Option<Facet> {
        match self {
            FacetArg::Year => Some(Facet::Year),
            FacetArg::Title => Some(Facet::Title),
            FacetArg::Type => Some(Facet::Type),
            FacetArg::Regulation => Some(Facet::Regulation),
            FacetArg::Status => None,
        }
    }
}

// ── Data sources ──

enum Source {
    Snapshot(SnapshotSource),
    Supabase(SupabaseClient),
}

impl Source {
    /// Snapshot wins; otherwise Supabase with URL and key from flags, env
    /// or config.
    fn resolve(cli: &Cli, settings: &Settings) -> anyhow::Result<Self> {
        if let Some(path) = &cli.snapshot {
            return Ok(Source::Snapshot(SnapshotSource::new(path.clone())));
        }
        let Some(url) = cli.supabase_url.clone().or_else(|| settings.supabase_url.clone()) else {
            bail!("no data source: pass --snapshot or set SUPABASE_URL");
        };
        let Some(key) = cli.api_key.clone() else {
            bail!("missing Supabase key: pass --api-key or set SUPABASE_ANON_KEY");
        };
        let table = cli
            .table
            .clone()
            .or_else(|| settings.table.clone())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());
        Ok(Source::Supabase(SupabaseClient::new(url, key).with_table(table)))
    }

    /// The full record set. A failed fetch is logged and yields no records.
    async fn records(&self) -> Vec<Record> {
        let result = match self {
            Source::Snapshot(s) => s.fetch_all_records().await,
            Source::Supabase(s) => s.fetch_all_records().await,
        };
        result.unwrap_or_else(|err| {
            tracing::error!(%err, "failed to fetch records");
            Vec::new()
        })
    }

    async fn last_updated(&self) -> Option<DateTime<Utc>> {
        let result = match self {
            Source::Snapshot(s) => s.fetch_last_updated().await,
            Source::Supabase(s) => s.fetch_last_updated().await,
        };
        result.unwrap_or_else(|err| {
            tracing::error!(%err, "failed to fetch last update time");
            None
        })
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_session(records: Vec<Record>, today: NaiveDate, settings: &Settings) -> anyhow::Result<Session> {
    let mut session = Session::new(records, today)
        .with_catalog(settings.catalog.clone())
        .with_labels(settings.status_labels.clone())
        .with_recent_count(settings.recent_count)
        .with_page_size(settings.page_size)?;
    session.select_columns(&settings.default_columns);
    Ok(session)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::info!("portarias v{}", env!("CARGO_PKG_VERSION"));

    let settings = config::load_settings(cli.config.as_deref())?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    if matches!(cli.command, Command::Columns) {
        print!("{}", display::render_columns(&settings.catalog, &settings.default_columns));
        return Ok(());
    }

    let source = Source::resolve(&cli, &settings)?;

    if matches!(cli.command, Command::Updated) {
        match source.last_updated().await {
            Some(ts) => println!("Última atualização: {}", format_brasilia(ts)),
            None => println!("Última atualização: indisponível"),
        }
        return Ok(());
    }

    let records = source.records().await;
    let mut session = build_session(records, today, &settings)?;

    match &cli.command {
        Command::Recent { more } => {
            if *more {
                session.expand_recent();
            }
            print_view(&session);
        }
        Command::List {
            filters,
            page,
            page_size,
            columns,
        } => {
            if let Some(size) = *page_size {
                session = session.with_page_size(size)?;
            }
            if let Some(ids) = columns {
                session.select_columns(ids);
            }
            session.set_filter(filters.to_state(session.labels())?);
            if *page != 1
                && let Err(err) = session.go_to_page(*page)
            {
                eprintln!("{err}");
            }
            print_view(&session);
        }
        Command::Show { id } => {
            let Some(record) = session.find(*id) else {
                bail!("no record with id {id}");
            };
            print!(
                "{}",
                display::render_card(record, session.catalog(), today, session.labels())
            );
        }
        Command::Export {
            filters,
            all,
            columns,
            output,
        } => {
            if let Some(ids) = columns {
                session.select_columns(ids);
            }
            session.set_filter(filters.to_state(session.labels())?);
            let csv = match session.export_csv(*all) {
                Ok(csv) => csv,
                Err(ExportError::Empty) => {
                    tracing::warn!("nothing to export");
                    eprintln!("Nenhum registro para exportar.");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };
            match output {
                Some(path) => {
                    std::fs::write(path, &csv)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), bytes = csv.len(), "wrote CSV");
                }
                None => print!("{csv}"),
            }
        }
        Command::Facets { facet } => {
            let out = match facet.facet() {
                Some(facet) => display::render_facet_options(&facet_options(session.records(), facet)),
                None => display::render_status_options(
                    &status_counts(session.records(), today),
                    session.labels(),
                ),
            };
            print!("{out}");
        }
        Command::Columns | Command::Updated => {}
    }
    Ok(())
}

fn print_view(session: &Session) {
    let view = session.displayed();
    let columns = session.columns();
    print!(
        "{}",
        display::render_table(&view.rows, &columns, session.today(), session.labels())
    );
    print!(
        "{}",
        display::render_footer(&view, session.filter().effective_query())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_does_not_error() {
        let err = Cli::try_parse_from(["portarias", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn list_with_filters() {
        let cli = Cli::try_parse_from([
            "portarias",
            "list",
            "--query",
            "sao paulo",
            "--type",
            "NULL",
            "--status",
            "expired",
            "--page",
            "3",
            "--columns",
            "portaria,tipo",
        ])
        .unwrap();
        let Command::List {
            filters,
            page,
            columns,
            ..
        } = cli.command
        else {
            panic!("expected list");
        };
        assert_eq!(page, 3);
        assert_eq!(columns.unwrap(), ["portaria", "tipo"]);
        let state = filters.to_state(&StatusLabels::default()).unwrap();
        assert_eq!(state.query.as_deref(), Some("sao paulo"));
        assert_eq!(state.kind, Some(FacetValue::Missing));
        assert_eq!(state.status, Some(Status::Expired));
    }

    #[test]
    fn status_accepts_labels() {
        let filters = FilterArgs {
            status: Some("vigente (retificada)".into()),
            ..Default::default()
        };
        let state = filters.to_state(&StatusLabels::default()).unwrap();
        assert_eq!(state.status, Some(Status::RectifiedCurrent));
    }

    #[test]
    fn unknown_status_rejected() {
        let filters = FilterArgs {
            status: Some("suspensa".into()),
            ..Default::default()
        };
        assert!(filters.to_state(&StatusLabels::default()).is_err());
    }

    #[test]
    fn today_flag_parses_iso_dates() {
        let cli = Cli::try_parse_from(["portarias", "--today", "2025-01-01", "recent"]).unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(Cli::try_parse_from(["portarias", "--today", "01/01/2025", "recent"]).is_err());
    }

    #[test]
    fn snapshot_takes_precedence() {
        let cli = Cli::try_parse_from([
            "portarias",
            "--snapshot",
            "dump.json",
            "--supabase-url",
            "https://xyz.supabase.co",
            "recent",
        ])
        .unwrap();
        let source = Source::resolve(&cli, &Settings::default()).unwrap();
        assert!(matches!(source, Source::Snapshot(_)));
    }

    #[test]
    fn supabase_needs_a_key() {
        let cli = Cli::try_parse_from([
            "portarias",
            "--supabase-url",
            "https://xyz.supabase.co",
            "--api-key",
            "anon",
            "recent",
        ])
        .unwrap();
        assert!(Source::resolve(&cli, &Settings::default()).is_ok());

        let mut cli = cli;
        cli.api_key = None;
        assert!(Source::resolve(&cli, &Settings::default()).is_err());
    }

    #[test]
    fn session_uses_settings() {
        let settings = Settings {
            page_size: 2,
            default_columns: vec!["portaria".into()],
            ..Settings::default()
        };
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let session = build_session(Vec::new(), today, &settings).unwrap();
        assert_eq!(session.pagination().page_size(), 2);
        assert_eq!(session.selected_columns(), ["portaria"]);
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_session() {
        let source = Source::Snapshot(SnapshotSource::new("/nonexistent/portarias.json"));
        let records = source.records().await;
        assert!(records.is_empty());
        assert_eq!(source.last_updated().await, None);

        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let session = build_session(records, today, &Settings::default()).unwrap();
        let view = session.displayed();
        assert_eq!(view.mode, portarias_core::DisplayMode::Recent);
        assert!(view.rows.is_empty());
        assert_eq!(view.total, 0);
    }
}
