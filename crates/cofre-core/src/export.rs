//! Transaction export and CSV import
//!
//! Both directions use the same columns:
//! `date,kind,category,description,amount,detected_by`.
//! Imported rows carry a SHA-256 `import_hash`, so importing the same file
//! twice adds nothing the second time.

use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::{Database, TransactionFilter, TransactionInsertResult};
use crate::error::{Error, Result};
use crate::models::{DetectedBy, NewTransaction, Transaction, TransactionKind};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// One CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: NaiveDate,
    kind: &'static str,
    category: &'a str,
    description: &'a str,
    amount: String,
    detected_by: &'static str,
}

/// One CSV row as read back, before validation
///
/// `detected_by` is ignored: imported rows are always manual.
#[derive(Debug, Deserialize)]
struct RawCsvRow {
    date: String,
    kind: String,
    category: String,
    #[serde(default)]
    description: String,
    amount: String,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based line number, counting the header
    pub line: usize,
    pub reason: String,
}

/// Result of an import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub duplicates: usize,
    pub rejected: Vec<RejectedRow>,
}

impl Database {
    /// Render an owner's transactions as CSV or a JSON array
    ///
    /// Without an explicit sort, rows come out oldest first.
    pub fn export_transactions(
        &self,
        owner_id: i64,
        filter: TransactionFilter<'_>,
        format: ExportFormat,
    ) -> Result<String> {
        let filter = if filter.sort_field.is_none() && filter.sort_order.is_none() {
            filter.sort_order(Some("asc"))
        } else {
            filter
        };
        // SQLite treats a negative LIMIT as no limit
        let transactions = self.search_transactions(owner_id, filter, -1, 0)?;
        debug!(count = transactions.len(), "Exporting transactions");

        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&transactions)?),
            ExportFormat::Csv => transactions_to_csv(&transactions),
        }
    }

    /// Import CSV rows in the export layout
    ///
    /// Invalid rows are collected into `rejected` without aborting the rest.
    pub fn import_transactions_csv<R: Read>(&self, owner_id: i64, reader: R) -> Result<ImportStats> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut stats = ImportStats::default();

        for (idx, result) in rdr.deserialize::<RawCsvRow>().enumerate() {
            let line = idx + 2;
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    stats.rejected.push(RejectedRow {
                        line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let tx = match parse_row(owner_id, row) {
                Ok(tx) => tx,
                Err(e) => {
                    stats.rejected.push(RejectedRow {
                        line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.insert_imported_transaction(&tx)? {
                TransactionInsertResult::Inserted(_) => stats.imported += 1,
                TransactionInsertResult::Duplicate(_) => stats.duplicates += 1,
            }
        }

        info!(
            imported = stats.imported,
            duplicates = stats.duplicates,
            rejected = stats.rejected.len(),
            "CSV import complete"
        );
        Ok(stats)
    }
}

fn transactions_to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for tx in transactions {
        writer.serialize(CsvRow {
            date: tx.occurred_on,
            kind: tx.kind.as_str(),
            category: &tx.category,
            description: &tx.description,
            amount: tx.amount.to_string(),
            detected_by: tx.detected_by.as_str(),
        })?;
    }
    // Header only, even when there are no rows
    if transactions.is_empty() {
        writer.write_record(["date", "kind", "category", "description", "amount", "detected_by"])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}

fn parse_row(owner_id: i64, row: RawCsvRow) -> Result<NewTransaction> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .map_err(|_| Error::InvalidData(format!("Invalid date: {}", row.date)))?;
    let kind = TransactionKind::from_str(&row.kind).map_err(Error::InvalidData)?;
    let amount = parse_amount(&row.amount)?;

    let mut tx = NewTransaction {
        owner_id,
        kind,
        amount,
        category: row.category,
        description: row.description,
        occurred_on: date,
        detected_by: DetectedBy::Manual,
        original_message: None,
        import_hash: None,
    };
    tx.validate()?;
    tx.import_hash = Some(generate_hash(&tx));
    Ok(tx)
}

/// Accepts `45.50`, `45,50` and `1.234,56`
fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().trim_start_matches("R$").trim();
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    Decimal::from_str(&normalized)
        .map_err(|_| Error::InvalidAmount(format!("Unable to parse amount: {}", raw)))
}

/// Generate a unique hash for deduplication
fn generate_hash(tx: &NewTransaction) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tx.owner_id.to_be_bytes());
    hasher.update(tx.occurred_on.to_string().as_bytes());
    hasher.update(tx.kind.as_str().as_bytes());
    hasher.update(tx.category.trim().to_lowercase().as_bytes());
    hasher.update([0u8]);
    hasher.update(tx.description.trim().as_bytes());
    hasher.update([0u8]);
    // 12.5 and 12.50 hash the same
    hasher.update(tx.amount.normalize().to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seed(db: &Database) {
        let on = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        for (kind, amount, category, description, day) in [
            (TransactionKind::Income, dec!(5000), "Salary", "salário", 1),
            (TransactionKind::VariableExpense, dec!(45.50), "Food", "almoço, centro", 5),
            (TransactionKind::FixedExpense, dec!(1200), "Housing", "aluguel", 3),
        ] {
            db.create_transaction(&NewTransaction::manual(
                1,
                kind,
                amount,
                category,
                description,
                on(day),
            ))
            .unwrap();
        }
    }

    #[test]
    fn test_csv_export_layout() {
        let db = Database::in_memory().unwrap();
        seed(&db);

        let csv = db
            .export_transactions(1, TransactionFilter::new(), ExportFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,kind,category,description,amount,detected_by");
        assert_eq!(lines[1], "2024-03-01,income,Salary,salário,5000,manual");
        assert_eq!(lines[2], "2024-03-03,fixed_expense,Housing,aluguel,1200,manual");
        // Embedded comma is quoted
        assert_eq!(
            lines[3],
            "2024-03-05,variable_expense,Food,\"almoço, centro\",45.50,manual"
        );
    }

    #[test]
    fn test_empty_csv_export_has_header() {
        let db = Database::in_memory().unwrap();
        let csv = db
            .export_transactions(1, TransactionFilter::new(), ExportFormat::Csv)
            .unwrap();
        assert_eq!(csv.trim(), "date,kind,category,description,amount,detected_by");
    }

    #[test]
    fn test_json_export_is_array() {
        let db = Database::in_memory().unwrap();
        seed(&db);
        let json = db
            .export_transactions(
                1,
                TransactionFilter::new().kind(Some(TransactionKind::Income)),
                ExportFormat::Json,
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["kind"], "income");
        assert_eq!(items[0]["amount"], "5000");
    }

    #[test]
    fn test_export_then_import_skips_duplicates() {
        let source = Database::in_memory().unwrap();
        seed(&source);
        let csv = source
            .export_transactions(1, TransactionFilter::new(), ExportFormat::Csv)
            .unwrap();

        let target = Database::in_memory().unwrap();
        let first = target.import_transactions_csv(1, csv.as_bytes()).unwrap();
        assert_eq!(first.imported, 3);
        assert!(first.rejected.is_empty());

        let second = target.import_transactions_csv(1, csv.as_bytes()).unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(
            target
                .count_transactions(1, TransactionFilter::new())
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_reimport_into_same_db_adds_nothing() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&NewTransaction {
            owner_id: 1,
            kind: TransactionKind::VariableExpense,
            amount: dec!(45.50),
            category: "Food".into(),
            description: "almoço".into(),
            occurred_on: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            detected_by: DetectedBy::Rule,
            original_message: Some("R$ 45,50 almoço".into()),
            import_hash: None,
        })
        .unwrap();
        seed(&db);

        let csv = db
            .export_transactions(1, TransactionFilter::new(), ExportFormat::Csv)
            .unwrap();
        let stats = db.import_transactions_csv(1, csv.as_bytes()).unwrap();
        assert_eq!(stats.imported, 0);
        assert_eq!(stats.duplicates, 4);
        assert_eq!(
            db.count_transactions(1, TransactionFilter::new()).unwrap(),
            4
        );
    }

    #[test]
    fn test_import_rejects_bad_rows() {
        let db = Database::in_memory().unwrap();
        let csv = "\
date,kind,category,description,amount,detected_by
2024-03-01,variable_expense,Food,pão,\"8,50\",manual
2024-13-01,variable_expense,Food,bad date,10,manual
2024-03-02,refund,Food,bad kind,10,manual
2024-03-03,variable_expense,Food,zero,0,manual
2024-03-04,variable_expense,,no category,5,manual
";
        let stats = db.import_transactions_csv(1, csv.as_bytes()).unwrap();
        assert_eq!(stats.imported, 1);
        assert_eq!(
            stats.rejected.iter().map(|r| r.line).collect::<Vec<_>>(),
            vec![3, 4, 5, 6]
        );

        let tx = &db.recent_transactions(1, 1).unwrap()[0];
        assert_eq!(tx.amount, dec!(8.50));
        assert_eq!(tx.detected_by, DetectedBy::Manual);
    }

    #[test]
    fn test_hash_ignores_amount_scale() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let a = NewTransaction::manual(1, TransactionKind::Savings, dec!(12.5), "Savings", "x", date);
        let b = NewTransaction::manual(1, TransactionKind::Savings, dec!(12.50), "savings", "x", date);
        assert_eq!(generate_hash(&a), generate_hash(&b));

        let other_owner =
            NewTransaction::manual(2, TransactionKind::Savings, dec!(12.5), "Savings", "x", date);
        assert_ne!(generate_hash(&a), generate_hash(&other_owner));
    }
}
