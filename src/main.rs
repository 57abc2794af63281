use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;

use crate::config::Config;
use crate::db::Database;
use crate::report::Snapshot;

mod categorize;
mod config;
mod db;
mod export;
mod normalize;
mod render;
mod report;
mod statement;
mod transaction;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Config file path
    #[clap(long, default_value = "kobo.toml")]
    config: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a statement export, replacing the stored dataset
    Load {
        /// Statement CSV file
        file: PathBuf,
    },
    /// Print spending summaries
    Report {
        /// Restrict KPIs and totals to one YYYY-MM month
        #[clap(long)]
        month: Option<String>,
    },
    /// Export transactions to a CSV file
    Export {
        /// Output file
        file: PathBuf,

        /// Restrict the export to one YYYY-MM month
        #[clap(long)]
        month: Option<String>,
    },
    /// List the month-year keys present in the dataset
    Months,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli: Cli = Cli::parse();
    let config = Config::load(cli.config.as_str())
        .with_context(|| format!("Unable to read config {}", cli.config))?;

    match cli.command {
        Command::Load { file } => {
            let mut transactions =
                statement::read_statement(file.as_path(), config.statement.skip_rows)?;
            categorize::apply(&mut transactions);

            let db = Database::connect(&config.database)
                .await
                .context("Unable to connect to PostgreSQL")?;
            db.replace_all(&transactions)
                .await
                .context("Bulk load failed")?;
            println!("Loaded {} transactions", transactions.len());
        }

        Command::Report { month } => {
            let snapshot = load_snapshot(&config).await?;
            run_report(&snapshot, month.as_deref());
        }

        Command::Export { file, month } => {
            let snapshot = load_snapshot(&config).await?;
            let filtered = snapshot.filtered(month.as_deref());
            export::export_csv(file.as_path(), &filtered)?;
            println!("Exported {} transactions to {}", filtered.len(), file.display());
        }

        Command::Months => {
            let snapshot = load_snapshot(&config).await?;
            if snapshot.is_empty() {
                println!("No transactions loaded");
            }
            for key in snapshot.month_keys() {
                println!("{key}");
            }
        }
    }

    Ok(())
}

async fn load_snapshot(config: &Config) -> anyhow::Result<Snapshot> {
    let db = Database::connect(&config.database)
        .await
        .context("Unable to connect to PostgreSQL")?;
    let transactions = db
        .load_snapshot()
        .await
        .context("Unable to read bank_transactions")?;

    Ok(Snapshot::new(transactions))
}

fn run_report(snapshot: &Snapshot, month: Option<&str>) {
    if snapshot.is_empty() {
        println!("No transactions loaded. Run 'kobo load <statement.csv>' first.");
        return;
    }

    if let Some(key) = month {
        if !snapshot.month_keys().iter().any(|k| k == key) {
            println!("No transactions in {key}. Months with data:");
            for k in snapshot.month_keys() {
                println!("  {k}");
            }
            return;
        }
    }

    let filtered = snapshot.filtered(month);

    render::print_kpis(&report::kpis(snapshot, month));

    println!("\nSpending by category");
    render::print_category_totals(&report::category_totals(&filtered));

    println!("\nSpending by channel");
    render::print_channel_totals(&report::channel_totals(&filtered));

    println!("\nMonthly trend");
    render::print_monthly_trend(&report::monthly_trend(snapshot.all()));

    println!("\nSavings activity");
    let savings = report::savings_activity(snapshot);
    if savings.is_empty() {
        println!("No savings transactions found yet");
    } else {
        render::print_transactions(&savings);
        let (moved_in, withdrawn) = report::savings_totals(snapshot.all());
        println!("Moved {moved_in:.2} into savings and withdrawn {withdrawn:.2} so far");
    }

    println!("\nTransactions");
    let mut listing = filtered;
    listing.reverse();
    render::print_transactions(&listing);
}
