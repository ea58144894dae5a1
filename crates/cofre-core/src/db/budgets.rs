//! Budget operations
//!
//! A budget is keyed by (owner, category, month, year), with the category
//! compared case-insensitively; setting it again replaces the limit.

use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::{decimal_column, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ensure_positive, Budget};
use crate::period::Period;

impl Database {
    /// Create or replace the limit for a category in a period
    pub fn upsert_budget(
        &self,
        owner_id: i64,
        category: &str,
        monthly_limit: Decimal,
        period: &Period,
    ) -> Result<i64> {
        ensure_positive(monthly_limit, "budget limit")?;
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::InvalidData("Budget category must not be empty".into()));
        }

        let conn = self.conn()?;

        // Same matching as budget status: case-insensitive, Unicode aware
        let key = category.to_lowercase();
        let existing = {
            let mut stmt = conn.prepare(
                "SELECT id, category FROM budgets WHERE owner_id = ? AND month = ? AND year = ?",
            )?;
            let rows = stmt
                .query_map(params![owner_id, period.month(), period.year()], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter()
                .find(|(_, name)| name.to_lowercase() == key)
                .map(|(id, _)| id)
        };

        if let Some(id) = existing {
            // Latest spelling of the category wins
            conn.execute(
                "UPDATE budgets SET category = ?, monthly_limit = ?, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?",
                params![category, monthly_limit.to_string(), id],
            )?;
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO budgets (owner_id, category, monthly_limit, month, year)
             VALUES (?, ?, ?, ?, ?)",
            params![
                owner_id,
                category,
                monthly_limit.to_string(),
                period.month(),
                period.year()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Budgets for a period, by category name
    pub fn list_budgets(&self, owner_id: i64, period: &Period) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, category, monthly_limit, month, year, created_at
             FROM budgets WHERE owner_id = ? AND month = ? AND year = ?
             ORDER BY category COLLATE NOCASE",
        )?;
        let rows = stmt.query_map(
            params![owner_id, period.month(), period.year()],
            row_to_budget,
        )?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT id, owner_id, category, monthly_limit, month, year, created_at
                 FROM budgets WHERE id = ?",
                params![id],
                row_to_budget,
            )
            .optional()?;
        Ok(budget)
    }

    pub fn delete_budget(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}

fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
    let created_at: String = row.get(6)?;
    Ok(Budget {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        category: row.get(2)?,
        monthly_limit: decimal_column(row, 3)?,
        month: row.get(4)?,
        year: row.get(5)?,
        created_at: parse_datetime(&created_at),
    })
}
