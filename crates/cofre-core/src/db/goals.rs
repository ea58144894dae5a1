//! Financial goal operations

use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::{decimal_column, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ensure_progress, FinancialGoal, NewGoal};

const GOAL_COLUMNS: &str =
    "id, owner_id, name, target_amount, current_amount, deadline, category, priority, created_at";

impl Database {
    pub fn create_goal(&self, goal: &NewGoal) -> Result<i64> {
        goal.validate()?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO goals (owner_id, name, target_amount, current_amount, deadline, category, priority)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                goal.owner_id,
                goal.name.trim(),
                goal.target_amount.to_string(),
                goal.current_amount.to_string(),
                goal.deadline.map(|d| d.to_string()),
                goal.category,
                goal.priority,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_goal(&self, id: i64) -> Result<Option<FinancialGoal>> {
        let conn = self.conn()?;
        let goal = conn
            .query_row(
                &format!("SELECT {} FROM goals WHERE id = ?", GOAL_COLUMNS),
                params![id],
                row_to_goal,
            )
            .optional()?;
        Ok(goal)
    }

    /// Goals ordered by priority (highest first), then nearest deadline
    pub fn list_goals(&self, owner_id: i64, include_completed: bool) -> Result<Vec<FinancialGoal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE owner_id = ?
             ORDER BY priority DESC, deadline IS NULL, deadline ASC, id ASC",
            GOAL_COLUMNS
        ))?;
        let goals = stmt
            .query_map(params![owner_id], row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Amounts are TEXT, so completion is decided here
        Ok(goals
            .into_iter()
            .filter(|g| include_completed || !g.is_completed())
            .collect())
    }

    /// Set the saved-so-far amount
    pub fn update_goal_progress(&self, id: i64, current_amount: Decimal) -> Result<FinancialGoal> {
        ensure_progress(current_amount)?;

        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE goals SET current_amount = ? WHERE id = ?",
            params![current_amount.to_string(), id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Goal {}", id)));
        }

        self.get_goal(id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))
    }

    pub fn delete_goal(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM goals WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}

fn row_to_goal(row: &rusqlite::Row) -> rusqlite::Result<FinancialGoal> {
    let deadline: Option<String> = row.get(5)?;
    let created_at: String = row.get(8)?;
    Ok(FinancialGoal {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: decimal_column(row, 3)?,
        current_amount: decimal_column(row, 4)?,
        deadline: deadline.and_then(|d| chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        category: row.get(6)?,
        priority: row.get(7)?,
        created_at: parse_datetime(&created_at),
    })
}
