//! Mock oracle for testing
//!
//! Useful for unit tests and development without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::categories::CategoryTable;
use crate::classifier::extract_amount;
use crate::error::{Error, Result};

use super::types::OracleClassification;
use super::TextClassifierOracle;

/// Spelled-out amounts the mock understands
const NUMBER_WORDS: &[(&str, i64)] = &[
    ("quinhentos", 500),
    ("duzentos", 200),
    ("cinquenta", 50),
    ("quarenta", 40),
    ("trinta", 30),
    ("vinte", 20),
    ("dez", 10),
    ("cem", 100),
    ("mil", 1000),
];

#[derive(Clone)]
enum Behavior {
    /// Keyword table plus spelled-out numbers
    Heuristic,
    /// Always the same answer
    Fixed(OracleClassification),
    /// Always an error
    Fail(String),
    /// Never answers
    Hang,
}

/// Mock oracle with configurable behavior and a call counter
#[derive(Clone)]
pub struct MockOracle {
    /// Whether health_check should return true
    pub healthy: bool,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOracle {
    /// Heuristic mock (healthy)
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Heuristic)
    }

    pub fn with_response(response: OracleClassification) -> Self {
        Self::with_behavior(Behavior::Fixed(response))
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            healthy: false,
            ..Self::with_behavior(Behavior::Fail(reason.to_string()))
        }
    }

    /// Never completes; callers must enforce their own timeout
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            healthy: true,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of classify calls made so far (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextClassifierOracle for MockOracle {
    async fn classify_message(
        &self,
        message: &str,
        _categories: &str,
        _timeout: Duration,
    ) -> Result<OracleClassification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Heuristic => Ok(heuristic_classification(message)),
            Behavior::Fixed(response) => Ok(response.clone()),
            Behavior::Fail(reason) => Err(Error::Oracle(reason.clone())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::Oracle("mock oracle woke up".into()))
            }
        }
    }
}

/// Best-effort reading used by the mock oracle and the mock Ollama server
pub(crate) fn heuristic_classification(message: &str) -> OracleClassification {
    let matched = CategoryTable::builtin().match_message(message);
    let lower = message.to_lowercase();

    let amount = extract_amount(message).or_else(|| {
        lower
            .split(|c: char| !c.is_alphanumeric())
            .find_map(|word| {
                NUMBER_WORDS
                    .iter()
                    .find(|(w, _)| *w == word)
                    .map(|(_, n)| Decimal::from(*n))
            })
    });

    let confidence = if amount.is_some() { 0.85 } else { 0.4 };

    OracleClassification {
        amount,
        category: matched.category,
        kind: matched.kind,
        description: message.trim().to_string(),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_heuristic_reads_number_words() {
        let oracle = MockOracle::new();
        let result = oracle
            .classify_message("gastei cinquenta no cinema", "", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(result.amount, Some(dec!(50)));
        assert_eq!(result.category, "Leisure");
        assert_eq!(result.kind, TransactionKind::VariableExpense);
        assert!(result.confidence > 0.7);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let oracle = MockOracle::failing("offline");
        assert!(!oracle.healthy);
        let result = oracle
            .classify_message("anything", "", Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(Error::Oracle(_))));
    }

    #[tokio::test]
    async fn test_call_counter_is_shared_across_clones() {
        let oracle = MockOracle::new();
        let clone = oracle.clone();
        clone
            .classify_message("dez reais", "", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(oracle.calls(), 1);
    }
}
