//! Import/export command implementations

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use cofre_core::{Database, ExportFormat, ImportStats, Period, TransactionFilter};

pub fn cmd_export(
    db: &Database,
    owner_id: i64,
    format: &str,
    output: Option<&Path>,
    period: Option<Period>,
) -> Result<()> {
    let format = ExportFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let filter =
        TransactionFilter::new().date_range(period.map(|p| (p.first_day(), p.last_day())));

    let content = db
        .export_transactions(owner_id, filter, format)
        .context("Failed to export transactions")?;

    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Exported transactions to {}", path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}

pub fn cmd_import(db: &Database, owner_id: i64, file: &Path) -> Result<ImportStats> {
    println!("📥 Importing {}...", file.display());

    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let stats = db
        .import_transactions_csv(owner_id, reader)
        .context("Failed to import transactions")?;

    println!();
    println!("   Imported:   {}", stats.imported);
    println!("   Duplicates: {} (skipped)", stats.duplicates);

    if !stats.rejected.is_empty() {
        println!("   Rejected:   {}", stats.rejected.len());
        for row in &stats.rejected {
            println!("      line {}: {}", row.line, row.reason);
        }
    }

    println!();
    println!("✅ Import complete");

    Ok(stats)
}
