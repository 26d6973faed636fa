//! Command line front-end for the asset dashboard
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{debug, info};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{default_config_path, Config, ConfigError};
use crate::dashboard::{Dashboard, NoticeLevel};
use crate::datatypes::date_time_helper::today;
use crate::datatypes::{AssetHandler, Category, DataError};
use crate::export::{
    export_file_name, read_assets_csv, write_assets_csv, write_report_csv, ExportError,
    ASSET_FILE_PREFIX, REPORT_FILE_PREFIX,
};
use crate::format::format_currency;
use crate::memory_handler::InMemoryDB;
use crate::render::{render_asset, render_cards, render_dashboard, render_table};
use crate::rest_handler::RestAssetHandler;
use crate::sample_data::{sample_assets, seed};
use crate::stats::{StatsError, TimeGrouping};
use crate::table::{AssetFilter, PageSize, SortColumn, SortDirection, SortOrder, TableError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Data(#[from] DataError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read answer: {0}")]
    Prompt(std::io::Error),
    #[error("backend already holds {0} assets, use --force to seed anyway")]
    NotEmpty(usize),
    /// The failure has been shown as notice already
    #[error("operation failed")]
    Reported,
}

#[derive(Parser, Debug)]
#[command(
    name = "assetql",
    version,
    about = "Manage and analyse assets of an asset management service",
    long_about = "assetql lists, creates, edits and deletes assets stored by an asset management \
                  service and shows statistics on them.\n\nExamples:\n  assetql list --category furniture --sort value --desc\n  \
                  assetql create --name Printer --category office --value 1299 --date 2024-02-10\n  \
                  assetql stats --group quarter\n  assetql --demo report"
)]
pub struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help = "Increase log output (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        global = true,
        help = "Root URL of the asset service, overrides config and environment."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to config file (defaults to ~/.assetql/config.json)."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "demo",
        global = true,
        help = "Work on an in-memory set of sample assets instead of the service."
    )]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the asset table
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_name = "COLUMN", help = "Sort column: id, name, category, value, purchase_date, description.")]
        sort: Option<SortColumn>,
        #[arg(long, requires = "sort", help = "Sort in descending order.")]
        desc: bool,
        #[arg(long, value_name = "SIZE", help = "Rows per page or 'all'.")]
        page_size: Option<PageSize>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, help = "Show cards instead of a table.")]
        cards: bool,
    },
    /// Show the dashboard statistics
    Stats {
        #[arg(long, default_value = "month", value_name = "PERIOD", help = "Timeline grouping: year, quarter or month.")]
        group: TimeGrouping,
    },
    /// Show a single asset
    Show { id: i32 },
    /// Create a new asset
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Category name or key, e.g. electronics, office, furniture.")]
        category: String,
        #[arg(long)]
        value: String,
        #[arg(long = "date", value_name = "YYYY-MM-DD")]
        purchase_date: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change fields of an existing asset
    Update {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long = "date", value_name = "YYYY-MM-DD")]
        purchase_date: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an asset after confirmation
    Delete {
        id: i32,
        #[arg(short = 'y', long, help = "Do not ask for confirmation.")]
        yes: bool,
    },
    /// Export the filtered asset list as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Export the dashboard report as CSV
    Report {
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Fill the service with sample assets or assets from a CSV export
    Seed {
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
        #[arg(long, help = "Seed even if the service holds assets already.")]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(short = 's', long, help = "Text contained in name, category or description.")]
    pub search: Option<String>,
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long, value_name = "AMOUNT")]
    pub min_value: Option<f64>,
    #[arg(long, value_name = "AMOUNT")]
    pub max_value: Option<f64>,
    #[arg(long = "from", value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,
    #[arg(long = "to", value_name = "YYYY-MM-DD")]
    pub end_date: Option<NaiveDate>,
}

impl From<FilterArgs> for AssetFilter {
    fn from(args: FilterArgs) -> Self {
        AssetFilter {
            search: args.search.filter(|s| !s.trim().is_empty()),
            category: args.category,
            min_value: args.min_value,
            max_value: args.max_value,
            start_date: args.start_date,
            end_date: args.end_date,
        }
    }
}

/// Config file, then environment, then command line
pub fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let config = match (&cli.config, default_config_path()) {
        (Some(path), _) => Config::load(path, false)?,
        (None, Some(path)) => Config::load(&path, true)?,
        (None, None) => Config::default(),
    };
    Ok(config.with_env().with_overrides(cli.url.clone(), None))
}

fn handler(cli: &Cli, config: &Config) -> Result<Arc<dyn AssetHandler + Send + Sync>, CliError> {
    if cli.demo {
        info!("using in-memory sample data");
        return Ok(Arc::new(InMemoryDB::with_assets(&sample_assets())?));
    }
    debug!("using asset service at {}", config.base_url);
    Ok(Arc::new(RestAssetHandler::new(
        &config.base_url,
        config.request_timeout(),
    )?))
}

// Print the collected notices and turn a failed gateway call into an already
// reported error.
fn finish<T>(dashboard: &mut Dashboard, result: Result<T, DataError>) -> Result<T, CliError> {
    for notice in dashboard.take_notices() {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.text),
            NoticeLevel::Error => eprintln!("error: {}", notice.text),
        }
    }
    result.map_err(|_| CliError::Reported)
}

fn create_file(path: &Path) -> Result<BufWriter<File>, CliError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn output_path(output: Option<PathBuf>, prefix: &str) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(export_file_name(prefix, today())))
}

async fn confirm(question: &str) -> Result<bool, CliError> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush().map_err(CliError::Prompt)?;
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .map_err(CliError::Prompt)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let handler = handler(&cli, &config)?;
    let symbol = config.currency_symbol.clone();

    if let Command::Seed { file, force } = &cli.command {
        let existing = handler.get_all_assets().await?.len();
        if existing > 0 && !*force {
            return Err(CliError::NotEmpty(existing));
        }
        let assets = match file {
            Some(path) => read_assets_csv(File::open(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?)?,
            None => sample_assets(),
        };
        let report = seed(handler.as_ref(), &assets).await;
        println!(
            "created {} assets, {} failed",
            report.created.len(),
            report.failed
        );
        for (category, stats) in report.by_category() {
            println!(
                "  {}: {} ({})",
                category,
                stats.count,
                format_currency(stats.value, &symbol)
            );
        }
        return if report.failed > 0 {
            Err(CliError::Reported)
        } else {
            Ok(())
        };
    }

    let mut dashboard = Dashboard::new(handler, config.page_size()?, config.search_debounce());
    let loaded = dashboard.refresh().await;
    finish(&mut dashboard, loaded)?;

    match cli.command {
        Command::List {
            filter,
            sort,
            desc,
            page_size,
            page,
            cards,
        } => {
            dashboard.set_filter(filter.into());
            if let Some(column) = sort {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                dashboard.set_sort(SortOrder { column, direction });
            }
            if let Some(page_size) = page_size {
                dashboard.set_page_size(page_size);
            }
            if cards {
                print!("{}", render_cards(&dashboard.visible(), &symbol));
                return Ok(());
            }
            if page != 1 {
                dashboard.goto_page(page)?;
            }
            let view = dashboard.view();
            print!(
                "{}",
                render_table(
                    &dashboard.current_page(),
                    &view.sort_order(),
                    view.page_size(),
                    &symbol
                )
            );
            if !view.filter().is_empty() {
                let summary = dashboard.visible_summary();
                println!(
                    "Matching value {}, average {}",
                    format_currency(summary.total, &symbol),
                    format_currency(summary.mean, &symbol)
                );
            }
        }
        Command::Stats { group } => {
            let stats = dashboard.stats(group, today())?;
            print!("{}", render_dashboard(&stats, &symbol));
        }
        Command::Show { id } => match dashboard.asset(id) {
            Some(asset) => print!("{}", render_asset(asset, &symbol)),
            None => return Err(DataError::NotFound(format!("asset {}", id)).into()),
        },
        Command::Create {
            name,
            category,
            value,
            purchase_date,
            description,
        } => {
            let form = dashboard.form_mut();
            form.name = name;
            form.category = category;
            form.value = value;
            form.purchase_date = purchase_date;
            form.description = description.unwrap_or_default();
            let result = dashboard.create().await;
            let created = finish(&mut dashboard, result)?;
            print!("{}", render_asset(&created, &symbol));
        }
        Command::Update {
            id,
            name,
            category,
            value,
            purchase_date,
            description,
        } => {
            let result = dashboard.begin_edit(id).map(|_| ());
            finish(&mut dashboard, result)?;
            let form = dashboard.form_mut();
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(category) = category {
                form.category = category;
            }
            if let Some(value) = value {
                form.value = value;
            }
            if let Some(purchase_date) = purchase_date {
                form.purchase_date = purchase_date;
            }
            if let Some(description) = description {
                form.description = description;
            }
            let result = dashboard.save_edit().await;
            let updated = finish(&mut dashboard, result)?;
            print!("{}", render_asset(&updated, &symbol));
        }
        Command::Delete { id, yes } => {
            let result = dashboard.request_delete(id);
            let question = finish(&mut dashboard, result)?;
            if !yes && !confirm(&question).await? {
                dashboard.cancel_delete();
                println!("nothing deleted");
                return Ok(());
            }
            let result = dashboard.confirm_delete().await;
            finish(&mut dashboard, result)?;
        }
        Command::Export { filter, output } => {
            dashboard.set_filter(filter.into());
            let visible = dashboard.visible();
            let path = output_path(output, ASSET_FILE_PREFIX);
            if visible.is_empty() {
                return Err(ExportError::NothingToExport.into());
            }
            write_assets_csv(&visible, create_file(&path)?)?;
            println!("exported {} assets to {}", visible.len(), path.display());
        }
        Command::Report { output } => {
            let stats = dashboard.stats(TimeGrouping::Month, today())?;
            if stats.summary.count == 0 {
                return Err(ExportError::NothingToExport.into());
            }
            let path = output_path(output, REPORT_FILE_PREFIX);
            write_report_csv(
                &stats,
                Local::now().naive_local(),
                &symbol,
                create_file(&path)?,
            )?;
            println!("report written to {}", path.display());
        }
        Command::Seed { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "assetql",
            "--demo",
            "list",
            "--category",
            "furniture",
            "--min-value",
            "1000",
            "--from",
            "2023-01-01",
            "--sort",
            "value",
            "--desc",
            "--page-size",
            "all",
        ])
        .unwrap();
        assert!(cli.demo);
        match cli.command {
            Command::List {
                filter,
                sort,
                desc,
                page_size,
                ..
            } => {
                let filter = AssetFilter::from(filter);
                assert_eq!(filter.category, Some(Category::Furniture));
                assert_eq!(filter.min_value, Some(1000.0));
                assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2023, 1, 1));
                assert_eq!(sort, Some(SortColumn::Value));
                assert!(desc);
                assert_eq!(page_size, Some(PageSize::All));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn reject_invalid_arguments() {
        assert!(Cli::try_parse_from(["assetql", "list", "--category", "toys"]).is_err());
        assert!(Cli::try_parse_from(["assetql", "list", "--page-size", "0"]).is_err());
        assert!(Cli::try_parse_from(["assetql", "stats", "--group", "week"]).is_err());
        assert!(Cli::try_parse_from(["assetql", "delete"]).is_err());
    }

    #[test]
    fn url_flag_wins() {
        let cli = Cli::try_parse_from([
            "assetql",
            "--config",
            "/nonexistent/assetql.json",
            "stats",
        ])
        .unwrap();
        assert!(matches!(load_config(&cli), Err(CliError::Config(ConfigError::NotFound(_)))));

        let cli = Cli::try_parse_from(["assetql", "stats", "--url", "http://10.1.1.1:8000"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.base_url, "http://10.1.1.1:8000");
    }

    #[tokio::test]
    async fn demo_mode_runs_without_service() {
        let dir = std::env::temp_dir().join(format!("assetql-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("assets.csv");
        let cli = Cli::try_parse_from([
            "assetql",
            "--demo",
            "export",
            "--category",
            "furniture",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).await.unwrap();
        let exported = read_assets_csv(File::open(&output).unwrap()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(exported.len(), 3);
        assert!(exported.iter().all(|a| a.category == Category::Furniture));
    }

    #[tokio::test]
    async fn page_zero_is_rejected() {
        let cli = Cli::try_parse_from(["assetql", "--demo", "list", "--page", "0"]).unwrap();
        let result = run(cli).await;
        assert!(matches!(
            result,
            Err(CliError::Table(TableError::PageOutOfRange { page: 0, .. }))
        ));

        let cli = Cli::try_parse_from(["assetql", "--demo", "list", "--page", "1"]).unwrap();
        assert!(run(cli).await.is_ok());
        let cli = Cli::try_parse_from(["assetql", "--demo", "list", "--page", "2"]).unwrap();
        assert!(run(cli).await.is_err());
    }
}
