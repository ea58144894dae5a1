//! Cofre CLI - Personal budget assistant
//!
//! Usage:
//!   cofre init                       Initialize database
//!   cofre record "R$ 45,50 almoço"   Record a transaction from a message
//!   cofre summary                    Monthly totals and savings target
//!   cofre alerts                     Ranked budget alerts

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let today = commands::today();
    let owner = cli.owner;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Record { message, date } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let date = match date.as_deref() {
                Some(raw) => commands::parse_date(raw, "--date")?,
                None => today,
            };
            let classifier = commands::build_classifier(&config.classifier);
            commands::cmd_record(&db, classifier, owner, &message.join(" "), date).await?;
            Ok(())
        }
        Commands::Classify { message } => {
            let classifier = commands::build_classifier(&config.classifier);
            commands::cmd_classify(&classifier, &message.join(" ")).await
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(
                    &db,
                    owner,
                    &commands::ListOptions {
                        limit: 20,
                        sort: "date",
                        ..Default::default()
                    },
                ),
                Some(TransactionsAction::List {
                    limit,
                    search,
                    category,
                    kind,
                    period,
                    sort,
                    asc,
                }) => commands::cmd_transactions_list(
                    &db,
                    owner,
                    &commands::ListOptions {
                        limit,
                        search: search.as_deref(),
                        category: category.as_deref(),
                        kind: kind.as_deref(),
                        period: commands::explicit_period(period, today)?,
                        sort: &sort,
                        ascending: asc,
                    },
                ),
                Some(TransactionsAction::Edit {
                    id,
                    amount,
                    category,
                    kind,
                    description,
                    date,
                }) => commands::cmd_transactions_edit(
                    &db,
                    id,
                    &commands::EditOptions {
                        amount: amount.as_deref(),
                        category: category.as_deref(),
                        kind: kind.as_deref(),
                        description: description.as_deref(),
                        date: date.as_deref(),
                    },
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => {
                    let period = commands::resolve_period(PeriodArgs::default(), today)?;
                    commands::cmd_budgets_list(&db, &config, owner, &period, today)
                }
                Some(BudgetsAction::Set {
                    category,
                    limit,
                    period,
                }) => {
                    let period = commands::resolve_period(period, today)?;
                    commands::cmd_budgets_set(&db, owner, &category, &limit, &period)?;
                    Ok(())
                }
                Some(BudgetsAction::List { period }) => {
                    let period = commands::resolve_period(period, today)?;
                    commands::cmd_budgets_list(&db, &config, owner, &period, today)
                }
                Some(BudgetsAction::Delete { id }) => commands::cmd_budgets_delete(&db, id),
            }
        }
        Commands::Summary { period, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let period = commands::resolve_period(period, today)?;
            commands::cmd_summary(&db, &config, owner, &period, today, json)
        }
        Commands::Daily { period, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let period = commands::resolve_period(period, today)?;
            commands::cmd_daily(&db, &config, owner, &period, today, json)
        }
        Commands::Alerts { period, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let period = commands::resolve_period(period, today)?;
            commands::cmd_alerts(&db, &config, owner, &period, today, json)
        }
        Commands::Goals { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_goals_list(&db, owner, false, today),
                Some(GoalsAction::Add {
                    name,
                    target,
                    current,
                    deadline,
                    category,
                    priority,
                }) => {
                    commands::cmd_goals_add(
                        &db,
                        owner,
                        &commands::GoalOptions {
                            name: &name,
                            target: &target,
                            current: &current,
                            deadline: deadline.as_deref(),
                            category: category.as_deref(),
                            priority,
                        },
                    )?;
                    Ok(())
                }
                Some(GoalsAction::List { all }) => commands::cmd_goals_list(&db, owner, all, today),
                Some(GoalsAction::Progress { id, amount }) => {
                    commands::cmd_goals_progress(&db, id, &amount)
                }
                Some(GoalsAction::Delete { id }) => commands::cmd_goals_delete(&db, id),
            }
        }
        Commands::Export {
            format,
            output,
            period,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(
                &db,
                owner,
                &format,
                output.as_deref(),
                commands::explicit_period(period, today)?,
            )
        }
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, owner, &file)?;
            Ok(())
        }
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Config => commands::cmd_config(&config, cli.config.as_deref()),
    }
}
