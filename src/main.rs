use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use shelter::config::{
    data_dir, ensure_data_dir, load_config, load_items, load_ledger, ReportSettings,
    CONFIG_TEMPLATE, ITEMS_TEMPLATE,
};
use shelter::error::{Result, ShelterError};
use shelter::inventory::{
    current_on_hand, record_transaction, scoped_transactions, Transaction, TransactionKind,
};
use shelter::trend::{build_trend, DayPolicy, ReportRange, TrendReport, TrendRequest};

#[derive(Parser)]
#[command(name = "shelter")]
#[command(version, about = "Shelter inventory ledger and on-hand trends", long_about = None)]
struct Cli {
    /// Path to data directory (default: platform config dir)
    #[arg(short = 'C', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize data directory with template files
    Init,

    /// List inventory items with their current on-hand quantity
    Items,

    /// Record a stock movement
    Record {
        /// Item identifier from items.toml
        #[arg(short, long)]
        item: String,

        /// Movement type
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Quantity moved (must be greater than 0)
        #[arg(short, long)]
        quantity: f64,

        /// Back-date the movement (YYYY-MM-DD, default: now)
        #[arg(long)]
        date: Option<String>,

        /// Free-form note stored with the transaction
        #[arg(long)]
        note: Option<String>,
    },

    /// Show recorded transactions, newest first
    History {
        /// Only show transactions for this item
        #[arg(short, long)]
        item: Option<String>,

        /// Number of transactions to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show data directory status and stock totals
    Status,

    /// Reconstruct the daily on-hand trend from the transaction ledger
    Trend {
        /// Only include this item (default: all items combined)
        #[arg(short, long)]
        item: Option<String>,

        /// Report window ending today (default: from config.toml)
        #[arg(short, long, value_enum)]
        range: Option<ReportRange>,

        /// Read transactions from a JSON export instead of the local ledger
        #[arg(long, value_name = "FILE", requires = "on_hand")]
        transactions: Option<PathBuf>,

        /// Current on-hand quantity to anchor the trend on
        #[arg(long)]
        on_hand: Option<f64>,

        /// Last day of the report window (YYYY-MM-DD)
        #[arg(long, requires = "on_hand")]
        as_of: Option<String>,

        /// Time zone for day boundaries: local, utc or +HH:MM (default: from config.toml)
        #[arg(long)]
        timezone: Option<String>,

        /// Print the series as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    In,
    Out,
    Adjust,
}

impl From<KindArg> for TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::In => TransactionKind::In,
            KindArg::Out => TransactionKind::Out,
            KindArg::Adjust => TransactionKind::Adjust,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let dir = match cli.data_dir {
        Some(p) => p,
        None => data_dir()?,
    };
    tracing::debug!(data_dir = %dir.display(), "resolved data directory");

    match cli.command {
        Commands::Init => cmd_init(&dir),
        Commands::Items => cmd_items(&dir),
        Commands::Record {
            item,
            kind,
            quantity,
            date,
            note,
        } => cmd_record(&dir, &item, kind.into(), quantity, date, note),
        Commands::History { item, limit } => cmd_history(&dir, item, limit),
        Commands::Status => cmd_status(&dir),
        Commands::Trend {
            item,
            range,
            transactions,
            on_hand,
            as_of,
            timezone,
            json,
        } => cmd_trend(
            &dir,
            TrendArgs {
                item,
                range,
                transactions,
                on_hand,
                as_of,
                timezone,
                json,
            },
        ),
    }
}

/// Initialize data directory with template files
fn cmd_init(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Err(ShelterError::AlreadyInitialized(dir.to_path_buf()));
    }

    fs::create_dir_all(dir)?;
    fs::write(dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(dir.join("items.toml"), ITEMS_TEMPLATE)?;

    println!("Initialized shelter data at: {}", dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set your organization:  $EDITOR {}/config.toml",
        dir.display()
    );
    println!(
        "  2. Define your items:      $EDITOR {}/items.toml",
        dir.display()
    );
    println!();
    println!("Then record your first delivery:");
    println!("  shelter record --item <item-id> --kind in --quantity <quantity>");

    Ok(())
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "ON HAND")]
    on_hand: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "WHEN")]
    created_at: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "ITEM")]
    item: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "NOTE")]
    note: String,
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "DAY")]
    day: String,
    #[tabled(rename = "IN")]
    total_in: String,
    #[tabled(rename = "OUT")]
    total_out: String,
    #[tabled(rename = "NET")]
    net: String,
    #[tabled(rename = "ON HAND")]
    on_hand: String,
}

/// Whole numbers without decimals, everything else with two
fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn format_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_quantity(value))
    } else {
        format_quantity(value)
    }
}

/// List inventory items
fn cmd_items(dir: &Path) -> Result<()> {
    ensure_data_dir(dir)?;

    let items = load_items(dir)?;
    let ledger = load_ledger(dir)?;

    if items.is_empty() {
        println!("No items configured.");
        println!("Add items to: {}/items.toml", dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = items.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ItemRow> = sorted
        .iter()
        .map(|(id, item)| ItemRow {
            id: id.to_string(),
            name: item.name.clone(),
            unit: item.unit.clone(),
            category: item.category.clone().unwrap_or_default(),
            on_hand: format_quantity(ledger.on_hand_for(id)),
            status: if item.active { "active" } else { "inactive" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ShelterError::InvalidDate(input.to_string()))
}

/// Record a stock movement
fn cmd_record(
    dir: &Path,
    item_id: &str,
    kind: TransactionKind,
    quantity: f64,
    date: Option<String>,
    note: Option<String>,
) -> Result<()> {
    ensure_data_dir(dir)?;

    let date = date.as_deref().map(parse_date).transpose()?;
    let recorded = record_transaction(dir, item_id, kind, quantity, date, note)?;

    println!(
        "Recorded {} {} {} of {}",
        kind,
        format_quantity(quantity),
        recorded.item.unit,
        recorded.item.name
    );
    println!("  When:    {}", recorded.transaction.created_at);
    println!("  On hand: {}", format_quantity(recorded.on_hand));

    Ok(())
}

/// Show recorded transactions
fn cmd_history(dir: &Path, item: Option<String>, limit: Option<usize>) -> Result<()> {
    ensure_data_dir(dir)?;

    let ledger = load_ledger(dir)?;
    let entries: Vec<&Transaction> = ledger
        .transactions
        .iter()
        .rev()
        .filter(|tx| match &item {
            Some(id) => tx.item_id.as_deref() == Some(id.as_str()),
            None => true,
        })
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    if entries.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    let rows: Vec<HistoryRow> = entries
        .iter()
        .enumerate()
        .map(|(idx, tx)| HistoryRow {
            index: idx + 1,
            created_at: tx.created_at.clone(),
            kind: tx.kind.to_string(),
            item: tx.item_id.clone().unwrap_or_default(),
            quantity: format_quantity(tx.quantity),
            note: tx.note.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} transactions", ledger.transactions.len());

    Ok(())
}

/// Show data directory status
fn cmd_status(dir: &Path) -> Result<()> {
    ensure_data_dir(dir)?;

    let config = load_config(dir)?;
    let items = load_items(dir)?;
    let ledger = load_ledger(dir)?;
    let active = items.values().filter(|i| i.active).count();

    println!("Shelter Status");
    println!("{}", "-".repeat(50));
    println!("Data directory:   {}", dir.display());
    println!("Organization:     {}", config.organization.name);
    println!("Items:            {} ({} active)", items.len(), active);
    println!("Transactions:     {}", ledger.transactions.len());
    println!(
        "Total on hand:    {}",
        format_quantity(current_on_hand(&ledger, &items, None))
    );
    println!(
        "Reports:          {} range, {} time zone",
        config.reports.default_range, config.reports.timezone
    );

    if !ledger.transactions.is_empty() {
        println!();
        println!("Recent transactions:");
        for tx in ledger.transactions.iter().rev().take(5) {
            println!(
                "  {} - {} {} - {}",
                tx.created_at,
                tx.kind,
                format_quantity(tx.quantity),
                tx.item_id.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

struct TrendArgs {
    item: Option<String>,
    range: Option<ReportRange>,
    transactions: Option<PathBuf>,
    on_hand: Option<f64>,
    as_of: Option<String>,
    timezone: Option<String>,
    json: bool,
}

/// Load a JSON array of transaction records exported by the data store
fn load_transactions_file(path: &Path) -> Result<Vec<Transaction>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ShelterError::TransactionsParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reconstruct the on-hand trend
fn cmd_trend(dir: &Path, args: TrendArgs) -> Result<()> {
    // External exports work without an initialized data directory
    let settings = if dir.exists() {
        load_config(dir)?.reports
    } else if args.transactions.is_some() {
        ReportSettings::default()
    } else {
        return Err(ShelterError::DataDirNotFound(dir.to_path_buf()));
    };

    let timezone = args.timezone.as_deref().unwrap_or(settings.timezone.as_str());
    let policy = DayPolicy::parse(timezone)?;
    let range = args.range.unwrap_or(settings.default_range);
    let today = match args.as_of.as_deref() {
        Some(s) => parse_date(s)?,
        None => policy.today(),
    };

    let (transactions, on_hand, label) = match &args.transactions {
        Some(path) => {
            let transactions = load_transactions_file(path)?;
            let label = args.item.clone().unwrap_or_else(|| "all items".to_string());
            (transactions, args.on_hand.unwrap_or(0.0), label)
        }
        None => {
            let items = load_items(dir)?;
            let ledger = load_ledger(dir)?;
            let label = match &args.item {
                Some(id) => items
                    .get(id)
                    .map(|item| item.name.clone())
                    .ok_or_else(|| ShelterError::ItemNotFound(id.clone()))?,
                None => "all items".to_string(),
            };
            let on_hand = args
                .on_hand
                .unwrap_or_else(|| current_on_hand(&ledger, &items, args.item.as_deref()));
            let transactions =
                scoped_transactions(ledger.transactions, &items, args.item.as_deref());
            (transactions, on_hand, label)
        }
    };

    tracing::info!(
        %range,
        transactions = transactions.len(),
        on_hand,
        today = %today,
        "building trend"
    );

    let request = TrendRequest {
        range,
        item_id: args.item.clone(),
        today,
        policy,
    };
    let report = build_trend(&request, &transactions, on_hand);

    if args.json {
        let json =
            serde_json::to_string_pretty(&report.series).map_err(|e| ShelterError::Serialize {
                what: "trend series".to_string(),
                reason: e.to_string(),
            })?;
        println!("{json}");
        return Ok(());
    }

    print_trend(&report, &label);
    Ok(())
}

fn print_trend(report: &TrendReport, label: &str) {
    println!("On-hand trend for {} ({})", label, report.range);

    let rows: Vec<TrendRow> = report
        .series
        .iter()
        .map(|p| TrendRow {
            day: p.day.to_string(),
            total_in: format_quantity(p.total_in),
            total_out: format_quantity(p.total_out),
            net: format_signed(p.net_change),
            on_hand: if p.on_hand < 0.0 {
                format!("{} !", format_quantity(p.on_hand))
            } else {
                format_quantity(p.on_hand)
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let summary = &report.summary;
    println!("Current on hand: {}", format_quantity(summary.current_on_hand));
    println!("Total in:        {}", format_quantity(summary.total_in));
    println!("Total out:       {}", format_quantity(summary.total_out));
    println!("Net change:      {}", format_signed(summary.net_change));

    let negative = report.negative_days();
    if let Some(first) = negative.first() {
        println!();
        println!(
            "Warning: reconstructed on-hand is negative on {} day(s), starting {}.",
            negative.len(),
            first
        );
        println!("The ledger may be missing entries, or the current count may be off.");
    }
}
