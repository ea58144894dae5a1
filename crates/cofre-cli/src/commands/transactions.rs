//! Transaction command implementations

use std::str::FromStr;

use anyhow::Result;
use cofre_core::{Database, Period, TransactionFilter, TransactionKind, TransactionUpdate};

use super::{format_money, parse_amount, parse_date, truncate};

/// Filters accepted by `transactions list`
#[derive(Debug, Default)]
pub struct ListOptions<'a> {
    pub limit: i64,
    pub search: Option<&'a str>,
    pub category: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub period: Option<Period>,
    pub sort: &'a str,
    pub ascending: bool,
}

fn parse_kind(raw: Option<&str>) -> Result<Option<TransactionKind>> {
    raw.map(|k| TransactionKind::from_str(k).map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}

pub fn cmd_transactions_list(db: &Database, owner_id: i64, options: &ListOptions<'_>) -> Result<()> {
    let sort_field = match options.sort {
        "date" | "amount" | "description" => options.sort,
        other => anyhow::bail!(
            "Unknown sort field: {}. Available: date, amount, description",
            other
        ),
    };

    let filter = TransactionFilter::new()
        .search(options.search)
        .category(options.category)
        .kind(parse_kind(options.kind)?)
        .date_range(options.period.map(|p| (p.first_day(), p.last_day())))
        .sort_field(Some(sort_field))
        .sort_order(Some(if options.ascending { "asc" } else { "desc" }));

    let total = db.count_transactions(owner_id, filter.clone())?;
    let transactions = db.search_transactions(owner_id, filter, options.limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  cofre record \"R$ 45,50 almoço\"");
        return Ok(());
    }

    println!();
    println!(
        "📝 Transactions (showing {} of {})",
        transactions.len(),
        total
    );
    println!("   ─────────────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.kind == TransactionKind::Income {
            format!("\x1b[32m+{}\x1b[0m", format_money(tx.amount)) // Green for income
        } else if tx.kind.is_expense() {
            format!("\x1b[31m{}\x1b[0m", format_money(tx.amount)) // Red for expenses
        } else {
            format_money(tx.amount)
        };

        println!(
            "   [{}] {} │ {:>14} │ {:<16} │ {:<18} │ {}",
            tx.id,
            tx.occurred_on,
            amount_str,
            tx.kind.label(),
            truncate(&tx.category, 18),
            truncate(&tx.description, 30)
        );
    }

    Ok(())
}

/// Raw `transactions edit` flags
#[derive(Debug, Default)]
pub struct EditOptions<'a> {
    pub amount: Option<&'a str>,
    pub category: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub description: Option<&'a str>,
    pub date: Option<&'a str>,
}

pub fn cmd_transactions_edit(db: &Database, id: i64, options: &EditOptions<'_>) -> Result<()> {
    let update = TransactionUpdate {
        amount: options.amount.map(parse_amount).transpose()?,
        category: options.category.map(str::to_string),
        kind: parse_kind(options.kind)?,
        description: options.description.map(str::to_string),
        occurred_on: options.date.map(|d| parse_date(d, "--date")).transpose()?,
    };

    if update.is_empty() {
        println!("Nothing to change. Pass at least one of --amount, --category, --kind, --description, --date.");
        return Ok(());
    }

    let tx = db.update_transaction(id, &update)?;

    println!("✅ Updated transaction {}:", id);
    println!(
        "   {} │ {} │ {} │ {} │ {}",
        tx.occurred_on,
        format_money(tx.amount),
        tx.kind.label(),
        tx.category,
        truncate(&tx.description, 40)
    );

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    // Verify transaction exists
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    db.delete_transaction(id)?;

    println!("🗑️  Deleted transaction {}:", id);
    println!(
        "   {} │ {} │ {}",
        tx.occurred_on,
        format_money(tx.amount),
        truncate(&tx.description, 40)
    );

    Ok(())
}
