use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spendwise_api::SpendwiseClient;
use spendwise_core::{
    CategoryCatalog, CategoryGroup, ReconciliationSession, RowView, StatementFile, StatementType,
};
use std::path::PathBuf;

mod config;
mod edits;

use edits::RowEdits;

#[derive(Parser, Debug)]
#[command(name = "spendwise", version, about = "SpendWise statement import CLI")]
struct Cli {
    /// Backend base URL (overrides SPENDWISE_API and ~/.spendwise/config.toml)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview a statement CSV, apply per-row edits, optionally commit
    Import {
        /// Path to the statement CSV
        #[arg(long)]
        file: PathBuf,

        /// Target month, YYYY-MM
        #[arg(long)]
        month: String,

        /// "debit" (charges negative as-is) or "credit" (signs flipped once
        /// by the service before hashing)
        #[arg(long)]
        statement_type: Option<String>,

        /// Override a row's category: HASH=NAME (repeatable)
        #[arg(long = "set-category", value_name = "HASH=NAME")]
        set_category: Vec<String>,

        /// Override a row's budget group: HASH=ESSENTIAL|SURPLUS|DEBT
        #[arg(long = "set-group", value_name = "HASH=GROUP")]
        set_group: Vec<String>,

        /// Rewrite a row's description: HASH=TEXT (repeatable)
        #[arg(long = "set-description", value_name = "HASH=TEXT")]
        set_description: Vec<String>,

        /// Exclude a row by hash (repeatable)
        #[arg(long, value_name = "HASH")]
        exclude: Vec<String>,

        /// Re-include a previously excluded row by hash (repeatable)
        #[arg(long, value_name = "HASH")]
        include: Vec<String>,

        /// Commit the eligible rows after previewing (default: preview only)
        #[arg(long)]
        commit: bool,
    },

    /// Category catalog
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },

    /// List months that already hold committed transactions
    Months,

    /// Committed transactions for a month
    Transactions {
        /// Month to list, YYYY-MM
        #[arg(long)]
        month: String,
    },

    /// Monthly income/expense totals by budget group
    Summary {
        /// Month to summarize, YYYY-MM
        #[arg(long)]
        month: String,
    },
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// List known categories
    List,

    /// Create a category (idempotent: returns the existing one on a name hit)
    Add {
        #[arg(long)]
        name: String,

        /// ESSENTIAL, SURPLUS, or DEBT; ignored for income categories
        #[arg(long)]
        group: Option<String>,

        /// Mark as an income category (no budget group)
        #[arg(long)]
        income: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::read_config()?;
    let client = SpendwiseClient::new(config::resolve_base_url(cli.base_url, &cfg));

    match cli.command {
        Command::Import {
            file,
            month,
            statement_type,
            set_category,
            set_group,
            set_description,
            exclude,
            include,
            commit,
        } => {
            let statement_type = resolve_statement_type(statement_type, &cfg)?;
            let edits = RowEdits {
                categories: set_category,
                groups: set_group,
                descriptions: set_description,
                exclude,
                include,
            };
            run_import(&client, file, month, statement_type, edits, commit).await?;
        }

        Command::Categories { command } => match command {
            CategoriesCommand::List => {
                let catalog = client.list_categories().await?;
                for c in catalog.categories() {
                    let kind = if c.is_income {
                        "INCOME".to_string()
                    } else {
                        c.group.map(|g| g.as_str().to_string()).unwrap_or_else(|| "-".into())
                    };
                    println!("{:<24} {kind}", c.name);
                }
            }
            CategoriesCommand::Add { name, group, income } => {
                let group = match (&group, income) {
                    (Some(g), false) => Some(
                        g.parse::<CategoryGroup>()
                            .map_err(|e| anyhow::anyhow!(e))?,
                    ),
                    _ => None,
                };
                let created = client.create_category(&name, group, income).await?;
                let kind = if created.is_income {
                    "INCOME".to_string()
                } else {
                    created.group.map(|g| g.as_str().to_string()).unwrap_or_else(|| "-".into())
                };
                println!("{} ({kind})", created.name);
            }
        },

        Command::Months => {
            for m in client.list_months().await? {
                println!("{m}");
            }
        }

        Command::Transactions { month } => {
            let txns = client.list_transactions().await?;
            let mut shown = 0usize;
            for t in txns {
                if t.posted_at.format("%Y-%m").to_string() != month {
                    continue;
                }
                let category = t.category.map(|c| c.name).unwrap_or_else(|| "-".into());
                println!(
                    "{} {:>12.2}  {:<20} {}",
                    t.posted_at, t.amount, category, t.description
                );
                shown += 1;
            }
            println!("\n{shown} transactions in {month}");
        }

        Command::Summary { month } => {
            let s = client.monthly_summary(&month).await?;
            println!("{}", s.month);
            println!("  income    {:>12.2}", s.income);
            println!("  expenses  {:>12.2}", s.expenses);
            println!("    essential {:>10.2}", s.by_group.essential);
            println!("    surplus   {:>10.2}", s.by_group.surplus);
            println!("    debt      {:>10.2}", s.by_group.debt);
            println!("  net       {:>12.2}", s.net);
        }
    }

    Ok(())
}

fn resolve_statement_type(flag: Option<String>, cfg: &config::Config) -> Result<StatementType> {
    let raw = flag
        .or_else(|| cfg.default_statement_type.clone())
        .unwrap_or_else(|| "debit".to_string());
    raw.parse::<StatementType>().map_err(|e| anyhow::anyhow!(e))
}

async fn run_import(
    client: &SpendwiseClient,
    path: PathBuf,
    month: String,
    statement_type: StatementType,
    edits: RowEdits,
    commit: bool,
) -> Result<()> {
    let bytes = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement.csv".to_string());

    // The catalog is advisory: without it every category resolves
    // non-income and group-applicable, so the import still works.
    let catalog = match client.list_categories().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("warning: category catalog unavailable ({e})");
            CategoryCatalog::default()
        }
    };

    let file = StatementFile::new(name, bytes);

    let mut session = ReconciliationSession::new();
    session.select_file(file.clone());
    session.set_month(&month);
    session.set_statement_type(statement_type);

    let ticket = session.begin_preview()?;
    let batch = match client.preview(&file, &month, statement_type).await {
        Ok(batch) => batch,
        Err(e) => {
            session.abandon(ticket);
            return Err(e).context("preview failed");
        }
    };
    let parse_errors = batch.errors_total;
    let errors_sample = batch.errors_sample.clone();
    session.apply_preview(ticket, batch)?;

    edits.apply(&mut session, &catalog)?;

    println!(
        "Previewed {} rows for {month} ({} statement)",
        session.rows().len(),
        statement_type.as_str()
    );
    if parse_errors > 0 {
        println!("{parse_errors} rows failed to parse:");
        for err in &errors_sample {
            println!("  {err}");
        }
    }
    println!();
    print_rows(&session.resolved_rows(&catalog));
    println!("\nEligible to insert: {}", session.eligible_count());

    if !commit {
        println!("Dry run only; pass --commit to insert the eligible rows.");
        return Ok(());
    }

    let (ticket, request) = session.begin_commit(&catalog)?;
    match client.commit(&request).await {
        Ok(outcome) => {
            session.complete_commit(ticket)?;
            println!("Inserted {}, skipped {}.", outcome.inserted, outcome.skipped);
        }
        Err(e) => {
            session.abandon(ticket);
            return Err(e).context("commit failed; re-run with the same flags to retry");
        }
    }

    Ok(())
}

fn print_rows(views: &[RowView<'_>]) {
    println!(
        "{:<4} {:<12} {:<12} {:>12} {:<20} {:<10} {:<9} description",
        "", "hash", "date", "amount", "category", "group", "in-month"
    );
    for v in views {
        let marker = if v.eligible {
            "+"
        } else if v.included {
            "~" // included but out of month: will not be inserted
        } else {
            "-"
        };
        let group = match (v.category.is_income, v.group) {
            (true, _) => "income".to_string(),
            (false, Some(g)) => g.as_str().to_lowercase(),
            (false, None) => "-".to_string(),
        };
        println!(
            "{marker:<4} {:<12} {:<12} {:>12.2} {:<20} {group:<10} {:<9} {}",
            short_hash(&v.row.hash),
            v.row.date.to_string(),
            v.row.amount,
            v.category.name,
            if v.row.in_target_month { "yes" } else { "no" },
            v.description,
        );
    }
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
