//! Message intake: classify a message and record it as a transaction

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::classifier::{Classification, Classifier};
use crate::db::Database;
use crate::error::Result;
use crate::models::{max_amount, NewTransaction, Transaction};

/// What happened to a message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Recorded {
        transaction: Transaction,
        confidence: f64,
    },
    /// Normal outcome for messages with no usable amount
    Unrecognized { message: String, reason: String },
}

impl RecordOutcome {
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Recorded { transaction, .. } => Some(transaction),
            Self::Unrecognized { .. } => None,
        }
    }
}

/// Classifies messages and persists the recognized ones
#[derive(Clone)]
pub struct Intake {
    db: Database,
    classifier: Classifier,
}

impl Intake {
    pub fn new(db: Database, classifier: Classifier) -> Self {
        Self { db, classifier }
    }

    /// Classify without writing anything
    pub async fn preview(&self, message: &str) -> Classification {
        self.classifier.classify_with_escalation(message.trim()).await
    }

    pub async fn record_message(
        &self,
        owner_id: i64,
        message: &str,
        occurred_on: NaiveDate,
    ) -> Result<RecordOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(RecordOutcome::Unrecognized {
                message: String::new(),
                reason: "Empty message".into(),
            });
        }

        let classification = self.classifier.classify_with_escalation(message).await;

        let amount = match classification.amount {
            Some(amount) if classification.is_recognized() => amount,
            Some(amount) => {
                return Ok(RecordOutcome::Unrecognized {
                    message: message.to_string(),
                    reason: format!(
                        "Amount must be positive and at most {}, found {}",
                        max_amount(),
                        amount
                    ),
                })
            }
            None => {
                return Ok(RecordOutcome::Unrecognized {
                    message: message.to_string(),
                    reason: "No amount found in message".into(),
                })
            }
        };

        let new_tx = NewTransaction {
            owner_id,
            kind: classification.kind,
            amount,
            category: classification.category,
            description: classification.description,
            occurred_on,
            detected_by: classification.detected_by,
            original_message: Some(message.to_string()),
            import_hash: None,
        };

        let id = self.db.create_transaction(&new_tx)?;
        let transaction = self.db.get_transaction(id)?.ok_or_else(|| {
            crate::error::Error::NotFound(format!("Transaction {} vanished after insert", id))
        })?;

        info!(
            id,
            owner_id,
            kind = transaction.kind.as_str(),
            category = %transaction.category,
            detected_by = transaction.detected_by.as_str(),
            "Transaction recorded"
        );

        Ok(RecordOutcome::Recorded {
            transaction,
            confidence: classification.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockOracle, OracleClassification};
    use crate::config::ClassifierConfig;
    use crate::models::{DetectedBy, TransactionKind};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    fn intake(classifier: Classifier) -> (Database, Intake) {
        let db = Database::in_memory().unwrap();
        (db.clone(), Intake::new(db, classifier))
    }

    #[tokio::test]
    async fn test_records_recognized_message() {
        let (db, intake) = intake(Classifier::default());
        let outcome = intake
            .record_message(1, "  R$ 45,50 almoço ", today())
            .await
            .unwrap();

        let RecordOutcome::Recorded { transaction, .. } = outcome else {
            panic!("expected a recorded transaction");
        };
        assert_eq!(transaction.amount, dec!(45.50));
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.kind, TransactionKind::VariableExpense);
        assert_eq!(transaction.detected_by, DetectedBy::Rule);
        assert_eq!(transaction.occurred_on, today());
        assert_eq!(
            transaction.original_message.as_deref(),
            Some("R$ 45,50 almoço")
        );
        assert_eq!(db.recent_transactions(1, 10).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_amount_creates_nothing() {
        let (db, intake) = intake(Classifier::default());
        let outcome = intake
            .record_message(1, "almoço com a equipe", today())
            .await
            .unwrap();
        assert!(matches!(outcome, RecordOutcome::Unrecognized { .. }));
        assert!(outcome.transaction().is_none());
        assert!(db.recent_transactions(1, 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let (db, intake) = intake(Classifier::default());
        for message in ["mercado 0", "uber 0,00"] {
            let outcome = intake.record_message(1, message, today()).await.unwrap();
            assert!(matches!(outcome, RecordOutcome::Unrecognized { .. }), "{}", message);
        }
        assert!(db.recent_transactions(1, 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hyphenated_amount_is_recorded() {
        let (_db, intake) = intake(Classifier::default());
        let outcome = intake
            .record_message(1, "uber centro-20", today())
            .await
            .unwrap();
        let transaction = outcome.transaction().expect("hyphen is not a minus sign");
        assert_eq!(transaction.amount, dec!(20));
        assert_eq!(transaction.category, "Transport");
    }

    #[tokio::test]
    async fn test_oversized_amount_rejected() {
        let (db, intake) = intake(Classifier::default());
        for _ in 0..2 {
            let outcome = intake
                .record_message(1, "salário 70000000000000000000000000000", today())
                .await
                .unwrap();
            assert!(matches!(outcome, RecordOutcome::Unrecognized { .. }));
        }
        assert!(db.recent_transactions(1, 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_message() {
        let (_db, intake) = intake(Classifier::default());
        let outcome = intake.record_message(1, "   ", today()).await.unwrap();
        assert!(matches!(outcome, RecordOutcome::Unrecognized { .. }));
    }

    #[tokio::test]
    async fn test_oracle_fills_in_missing_amount() {
        let oracle = MockOracle::with_response(OracleClassification {
            amount: Some(dec!(50)),
            category: "leisure".into(),
            kind: TransactionKind::VariableExpense,
            description: "cinema".into(),
            confidence: 0.9,
        });
        let classifier =
            Classifier::new(ClassifierConfig::default()).with_oracle(Arc::new(oracle.clone()));
        let (_db, intake) = intake(classifier);

        let outcome = intake
            .record_message(1, "gastei cinquenta no cinema", today())
            .await
            .unwrap();
        let transaction = outcome.transaction().unwrap();
        assert_eq!(transaction.amount, dec!(50));
        assert_eq!(transaction.category, "Leisure");
        assert_eq!(transaction.detected_by, DetectedBy::Oracle);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_escalation_through_ollama_http() {
        use crate::ai::OllamaBackend;
        use crate::prompts::PromptLibrary;
        use crate::test_utils::MockOllamaServer;

        let server = MockOllamaServer::start().await.unwrap();
        let backend =
            OllamaBackend::with_prompts(&server.url(), "llama3.2", PromptLibrary::embedded_only());
        let classifier = Classifier::new(ClassifierConfig::default()).with_oracle(Arc::new(backend));
        let (db, intake) = intake(classifier);

        let outcome = intake
            .record_message(1, "gastei trinta no cinema", today())
            .await
            .unwrap();
        let transaction = outcome.transaction().expect("oracle supplied the amount");
        assert_eq!(transaction.amount, dec!(30));
        assert_eq!(transaction.detected_by, DetectedBy::Oracle);
        assert_eq!(server.generate_requests(), 1);

        // Rule pass has an amount: no HTTP call
        intake.record_message(1, "uber 23,90", today()).await.unwrap();
        assert_eq!(server.generate_requests(), 1);
        assert_eq!(db.recent_transactions(1, 10).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_preview_does_not_persist() {
        let (db, intake) = intake(Classifier::default());
        let classification = intake.preview("uber 23,90").await;
        assert_eq!(classification.amount, Some(dec!(23.90)));
        assert!(db.recent_transactions(1, 10).unwrap().is_empty());
    }
}
