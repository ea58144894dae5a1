//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::transaction_filter::TransactionFilter;
use super::{date_column, decimal_column, parse_datetime, parsed_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionUpdate};
use crate::period::Period;

const TRANSACTION_COLUMNS: &str = "t.id, t.owner_id, t.kind, t.amount, t.category, \
    t.description, t.occurred_on, t.detected_by, t.original_message, t.created_at, t.updated_at";

/// Result of inserting an imported transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInsertResult {
    /// Transaction was inserted, contains new transaction ID
    Inserted(i64),
    /// Same import_hash or identical content already stored, contains
    /// existing transaction ID
    Duplicate(i64),
}

impl Database {
    /// Persist a transaction and return its id
    pub fn create_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        tx.validate()?;
        let conn = self.conn()?;
        insert(&conn, tx)?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert unless the transaction is already stored
    ///
    /// A row is already stored when its import_hash matches, or when a row for
    /// the same owner has the same date, kind, category (ignoring case),
    /// description and amount. The second check catches rows that were
    /// recorded from messages and later exported.
    pub fn insert_imported_transaction(
        &self,
        tx: &NewTransaction,
    ) -> Result<TransactionInsertResult> {
        tx.validate()?;
        let conn = self.conn()?;

        if let Some(ref hash) = tx.import_hash {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE import_hash = ?",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        if let Some(existing_id) = find_same_content(&conn, tx)? {
            return Ok(TransactionInsertResult::Duplicate(existing_id));
        }

        insert(&conn, tx)?;
        Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()))
    }

    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions t WHERE t.id = ?",
                    TRANSACTION_COLUMNS
                ),
                params![id],
                row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Apply a partial edit and return the updated row
    pub fn update_transaction(&self, id: i64, update: &TransactionUpdate) -> Result<Transaction> {
        update.validate()?;

        if !update.is_empty() {
            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(amount) = update.amount {
                sets.push("amount = ?");
                values.push(Box::new(amount.to_string()));
            }
            if let Some(ref category) = update.category {
                sets.push("category = ?");
                values.push(Box::new(category.trim().to_string()));
            }
            if let Some(kind) = update.kind {
                sets.push("kind = ?");
                values.push(Box::new(kind.as_str()));
            }
            if let Some(ref description) = update.description {
                sets.push("description = ?");
                values.push(Box::new(description.clone()));
            }
            if let Some(date) = update.occurred_on {
                sets.push("occurred_on = ?");
                values.push(Box::new(date.to_string()));
            }
            values.push(Box::new(id));

            let sql = format!(
                "UPDATE transactions SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                sets.join(", ")
            );
            let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

            let conn = self.conn()?;
            let changed = conn.execute(&sql, refs.as_slice())?;
            if changed == 0 {
                return Err(Error::NotFound(format!("Transaction {}", id)));
            }
        }

        self.get_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    /// Returns false when nothing was deleted
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// All of an owner's transactions dated within `from..=to`, oldest first
    pub fn list_transactions_in_range(
        &self,
        owner_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions t
             WHERE t.owner_id = ? AND t.occurred_on >= ? AND t.occurred_on <= ?
             ORDER BY t.occurred_on ASC, t.id ASC",
            TRANSACTION_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![owner_id, from.to_string(), to.to_string()],
            row_to_transaction,
        )?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn list_transactions_for_period(
        &self,
        owner_id: i64,
        period: &Period,
    ) -> Result<Vec<Transaction>> {
        self.list_transactions_in_range(owner_id, period.first_day(), period.last_day())
    }

    /// Search an owner's transactions with paging
    pub fn search_transactions(
        &self,
        owner_id: i64,
        filter: TransactionFilter<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let result = filter.owner_id(Some(owner_id)).build();

        let sql = format!(
            "SELECT {} FROM transactions t {} {} LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS, result.where_clause, result.order_clause
        );

        let mut params = result.into_params();
        params.push(Box::new(limit));
        params.push(Box::new(offset));
        let refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(refs.as_slice(), row_to_transaction)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Count matching transactions (for pagination)
    pub fn count_transactions(&self, owner_id: i64, filter: TransactionFilter<'_>) -> Result<i64> {
        let conn = self.conn()?;
        let result = filter.owner_id(Some(owner_id)).build();
        let count = conn.query_row(
            &result.build_count_query(),
            result.params_refs().as_slice(),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Most recent transactions, newest first
    pub fn recent_transactions(&self, owner_id: i64, limit: i64) -> Result<Vec<Transaction>> {
        self.search_transactions(owner_id, TransactionFilter::new(), limit, 0)
    }
}

/// Amounts are TEXT, so they are compared as decimals here
fn find_same_content(conn: &rusqlite::Connection, tx: &NewTransaction) -> Result<Option<i64>> {
    let mut stmt = conn.prepare(
        "SELECT id, amount FROM transactions
         WHERE owner_id = ? AND occurred_on = ? AND kind = ?
           AND category = ? COLLATE NOCASE AND TRIM(description) = ?
         ORDER BY id ASC",
    )?;

    let candidates = stmt
        .query_map(
            params![
                tx.owner_id,
                tx.occurred_on.to_string(),
                tx.kind.as_str(),
                tx.category.trim(),
                tx.description.trim(),
            ],
            |row| Ok((row.get::<_, i64>(0)?, decimal_column(row, 1)?)),
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(candidates
        .into_iter()
        .find(|(_, amount)| *amount == tx.amount)
        .map(|(id, _)| id))
}

fn insert(conn: &rusqlite::Connection, tx: &NewTransaction) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO transactions (owner_id, kind, amount, category, description, occurred_on, detected_by, original_message, import_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            tx.owner_id,
            tx.kind.as_str(),
            tx.amount.to_string(),
            tx.category.trim(),
            tx.description,
            tx.occurred_on.to_string(),
            tx.detected_by.as_str(),
            tx.original_message,
            tx.import_hash,
        ],
    )?;
    Ok(())
}

pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;
    Ok(Transaction {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind: parsed_column(row, 2)?,
        amount: decimal_column(row, 3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        occurred_on: date_column(row, 6)?,
        detected_by: parsed_column(row, 7)?,
        original_message: row.get(8)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}
