//! Transaction filter builder for constructing dynamic SQL queries
//!
//! Shared by `search_transactions` and `count_transactions` so the two
//! never disagree about which rows match.

use chrono::NaiveDate;

use crate::models::TransactionKind;

/// Builder for constructing transaction query filters
///
/// The lifetime `'query` is how long borrowed filter values (search term,
/// category, sort names) must stay valid.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter<'query> {
    pub owner_id: Option<i64>,
    pub search: Option<&'query str>,
    pub category: Option<&'query str>,
    pub kind: Option<TransactionKind>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub sort_field: Option<&'query str>,
    pub sort_order: Option<&'query str>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> TransactionFilter<'query> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner_id(mut self, id: Option<i64>) -> Self {
        self.owner_id = id;
        self
    }

    /// Search description, category and the original message
    pub fn search(mut self, query: Option<&'query str>) -> Self {
        self.search = query;
        self
    }

    /// Exact category match (case-insensitive)
    pub fn category(mut self, category: Option<&'query str>) -> Self {
        self.category = category;
        self
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Inclusive on both ends
    pub fn date_range(mut self, range: Option<(NaiveDate, NaiveDate)>) -> Self {
        self.date_range = range;
        self
    }

    /// Sort field (date, amount or description)
    pub fn sort_field(mut self, field: Option<&'query str>) -> Self {
        self.sort_field = field;
        self
    }

    /// Sort order (asc or desc)
    pub fn sort_order(mut self, order: Option<&'query str>) -> Self {
        self.sort_order = order;
        self
    }

    /// Build the filter components
    pub fn build(self) -> FilterResult {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(owner) = self.owner_id {
            conditions.push("t.owner_id = ?".to_string());
            params.push(Box::new(owner));
        }

        if let Some(q) = self.search {
            if !q.trim().is_empty() {
                conditions.push(
                    "(t.description LIKE ? COLLATE NOCASE OR t.category LIKE ? COLLATE NOCASE \
                     OR t.original_message LIKE ? COLLATE NOCASE)"
                        .to_string(),
                );
                let pattern = format!("%{}%", q.trim());
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern));
            }
        }

        if let Some(category) = self.category {
            if !category.trim().is_empty() {
                conditions.push("t.category = ? COLLATE NOCASE".to_string());
                params.push(Box::new(category.trim().to_string()));
            }
        }

        if let Some(kind) = self.kind {
            conditions.push("t.kind = ?".to_string());
            params.push(Box::new(kind.as_str()));
        }

        if let Some((from_date, to_date)) = self.date_range {
            conditions.push("t.occurred_on >= ? AND t.occurred_on <= ?".to_string());
            params.push(Box::new(from_date.to_string()));
            params.push(Box::new(to_date.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // Amounts are TEXT, so sort on their numeric value
        let order_column = match self.sort_field {
            Some("amount") => "CAST(t.amount AS REAL)",
            Some("description") => "t.description COLLATE NOCASE",
            _ => "t.occurred_on",
        };
        let order_dir = match self.sort_order {
            Some("asc") => "ASC",
            _ => "DESC",
        };
        let order_clause = format!("ORDER BY {} {}, t.id DESC", order_column, order_dir);

        FilterResult {
            where_clause,
            order_clause,
            params,
        }
    }
}

impl FilterResult {
    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM transactions t {}", self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Take the parameter vector to append pagination params
    pub fn into_params(self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
    }
}
