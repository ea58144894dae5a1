//! Message classifier
//!
//! Turns a free-form message such as `R$ 45,50 almoço` into an amount, a
//! category, a transaction kind and a cleaned description.
//!
//! The deterministic pass is:
//! 1. amount extraction, trying currency-prefixed decimal, currency-prefixed
//!    integer, bare decimal and bare integer patterns in that order
//! 2. category and kind from the [`CategoryTable`]
//! 3. description with amounts and currency markers removed
//!
//! [`Classifier::classify_with_escalation`] adds an optional oracle pass for
//! messages the keyword pass cannot handle. Oracle failures never surface:
//! they are logged and the deterministic result is returned.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::ai::{OracleClassification, TextClassifierOracle};
use crate::categories::CategoryTable;
use crate::config::ClassifierConfig;
use crate::models::{is_valid_amount, DetectedBy, TransactionKind};

/// Description used when nothing is left after stripping amounts
pub const FALLBACK_DESCRIPTION: &str = "Expense";

/// Outcome of classifying one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// `None` when no amount could be found
    pub amount: Option<Decimal>,
    pub category: String,
    pub kind: TransactionKind,
    pub description: String,
    pub confidence: f64,
    pub detected_by: DetectedBy,
}

impl Classification {
    /// Whether this classification may become a transaction
    pub fn is_recognized(&self) -> bool {
        self.amount.is_some_and(is_valid_amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Separator {
    /// Last `.` or `,` is the decimal point
    Decimal,
    /// Any `.` groups thousands
    Integer,
}

struct AmountPattern {
    regex: Regex,
    separator: Separator,
}

fn amount_patterns() -> &'static [AmountPattern] {
    static PATTERNS: OnceLock<Vec<AmountPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (
                r"R\$\s*(\d{1,3}(?:\.\d{3})+,\d{2}|\d+[.,]\d{2})\b",
                Separator::Decimal,
            ),
            (r"R\$\s*(\d{1,3}(?:\.\d{3})+|\d+)\b", Separator::Integer),
            (
                r"(\d{1,3}(?:\.\d{3})+,\d{2}|\d+[.,]\d{2})\b",
                Separator::Decimal,
            ),
            (r"(\d{1,3}(?:\.\d{3})+\b|\d+)", Separator::Integer),
        ]
        .into_iter()
        .map(|(pattern, separator)| AmountPattern {
            regex: Regex::new(pattern).expect("valid regex"),
            separator,
        })
        .collect()
    })
}

fn description_strippers() -> &'static [Regex] {
    static STRIPPERS: OnceLock<Vec<Regex>> = OnceLock::new();
    STRIPPERS.get_or_init(|| {
        [
            r"R\$\s*\d+(?:[.,]\d+)*",
            r"\d+(?:[.,]\d+)*",
            r"R\$",
            r"\s+",
        ]
        .into_iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

/// Find the first amount in a message
///
/// A hyphen before the digits is not a sign. May return zero; callers
/// creating transactions must reject it.
pub fn extract_amount(message: &str) -> Option<Decimal> {
    for pattern in amount_patterns() {
        if let Some(caps) = pattern.regex.captures(message) {
            let amount = caps
                .get(1)
                .and_then(|m| parse_amount(m.as_str(), pattern.separator));
            if amount.is_some() {
                return amount;
            }
        }
    }
    None
}

fn parse_amount(raw: &str, separator: Separator) -> Option<Decimal> {
    let normalized = match separator {
        Separator::Integer => raw.replace('.', ""),
        Separator::Decimal if raw.contains(',') => raw.replace('.', "").replace(',', "."),
        Separator::Decimal => raw.to_string(),
    };
    Decimal::from_str(&normalized).ok()
}

/// Message with amounts and currency markers removed
pub fn clean_description(message: &str) -> String {
    let strippers = description_strippers();
    let mut text = message.to_string();
    for re in &strippers[..strippers.len() - 1] {
        text = re.replace_all(&text, " ").into_owned();
    }
    let collapsed = strippers[strippers.len() - 1].replace_all(text.trim(), " ");
    let cleaned = collapsed.trim();
    if cleaned.is_empty() {
        FALLBACK_DESCRIPTION.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Rule-based classifier with optional oracle escalation
#[derive(Clone)]
pub struct Classifier {
    table: CategoryTable,
    config: ClassifierConfig,
    oracle: Option<Arc<dyn TextClassifierOracle>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            table: CategoryTable::default(),
            config,
            oracle: None,
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn TextClassifierOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_table(mut self, table: CategoryTable) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// Deterministic keyword classification
    pub fn classify(&self, message: &str) -> Classification {
        let amount = extract_amount(message);
        let matched = self.table.match_message(message);

        debug!(
            amount = ?amount,
            kind = matched.kind.as_str(),
            category = %matched.category,
            keyword = ?matched.keyword,
            "Rule classification"
        );

        Classification {
            amount,
            category: matched.category,
            kind: matched.kind,
            description: clean_description(message),
            confidence: matched.confidence,
            detected_by: DetectedBy::Rule,
        }
    }

    /// Keyword classification, consulting the oracle when it is inconclusive
    pub async fn classify_with_escalation(&self, message: &str) -> Classification {
        let rule = self.classify(message);

        let Some(oracle) = self.oracle.as_ref() else {
            return rule;
        };
        if !self.should_escalate(&rule) {
            return rule;
        }

        let timeout = self.config.oracle_timeout();
        let catalogue = self.table.catalogue();
        let call = oracle.classify_message(message, &catalogue, timeout);

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(answer)) => self.merge_oracle_answer(rule, answer),
            Ok(Err(e)) => {
                warn!(error = %e, "Oracle classification failed, keeping rule result");
                rule
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.oracle_timeout_secs,
                    "Oracle classification timed out, keeping rule result"
                );
                rule
            }
        }
    }

    fn should_escalate(&self, rule: &Classification) -> bool {
        if rule.amount.is_none() {
            return true;
        }
        self.config
            .escalate_below_confidence
            .map(|threshold| rule.confidence < threshold)
            .unwrap_or(false)
    }

    fn merge_oracle_answer(
        &self,
        rule: Classification,
        answer: OracleClassification,
    ) -> Classification {
        if answer.confidence <= self.config.oracle_min_confidence {
            debug!(
                confidence = answer.confidence,
                min = self.config.oracle_min_confidence,
                "Oracle answer below confidence threshold, ignored"
            );
            return rule;
        }

        let category = self
            .table
            .canonical(answer.kind, &answer.category)
            .map(|c| c.to_string())
            .unwrap_or(answer.category);

        let description = if answer.description.is_empty() {
            rule.description
        } else {
            answer.description
        };

        Classification {
            amount: answer.amount.or(rule.amount),
            category,
            kind: answer.kind,
            description,
            confidence: answer.confidence,
            detected_by: DetectedBy::Oracle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockOracle;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_decimal_with_comma() {
        assert_eq!(extract_amount("R$ 45,50 almoço"), Some(dec!(45.50)));
        assert_eq!(extract_amount("almoço R$45.50"), Some(dec!(45.50)));
    }

    #[test]
    fn test_currency_thousands() {
        assert_eq!(extract_amount("aluguel R$ 1.234,56"), Some(dec!(1234.56)));
        assert_eq!(extract_amount("aluguel R$ 1.500"), Some(dec!(1500)));
    }

    #[test]
    fn test_currency_integer() {
        assert_eq!(extract_amount("R$ 30 cinema"), Some(dec!(30)));
    }

    #[test]
    fn test_bare_patterns() {
        assert_eq!(extract_amount("mercado 87,90"), Some(dec!(87.90)));
        assert_eq!(extract_amount("salário 5000"), Some(dec!(5000)));
    }

    #[test]
    fn test_bare_thousands() {
        assert_eq!(extract_amount("bônus 1.500"), Some(dec!(1500)));
    }

    #[test]
    fn test_decimal_beats_earlier_integer() {
        // Bare decimal outranks bare integer even when the integer comes first
        assert_eq!(extract_amount("dia 15 lanche 12,50"), Some(dec!(12.50)));
    }

    #[test]
    fn test_currency_beats_bare() {
        assert_eq!(extract_amount("2 pizzas R$ 80,00"), Some(dec!(80.00)));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract_amount("almoço com a equipe"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn test_zero_is_returned() {
        assert_eq!(extract_amount("lanche 0"), Some(dec!(0)));
    }

    #[test]
    fn test_hyphen_is_not_a_sign() {
        assert_eq!(extract_amount("lanche-25"), Some(dec!(25)));
        assert_eq!(extract_amount("uber centro-20"), Some(dec!(20)));
        assert_eq!(extract_amount("estorno -20"), Some(dec!(20)));
        assert_eq!(extract_amount("pizza-12,50"), Some(dec!(12.50)));
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description("R$ 45,50 almoço"), "almoço");
        assert_eq!(clean_description("  uber   23,90  centro "), "uber centro");
        assert_eq!(clean_description("R$ 100"), FALLBACK_DESCRIPTION);
        assert_eq!(clean_description("1.234,56"), FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_classify_rule_pass() {
        let classifier = Classifier::default();
        let c = classifier.classify("R$ 45,50 almoço");
        assert_eq!(c.amount, Some(dec!(45.50)));
        assert_eq!(c.kind, TransactionKind::VariableExpense);
        assert_eq!(c.category, "Food");
        assert_eq!(c.description, "almoço");
        assert_eq!(c.detected_by, DetectedBy::Rule);
        assert!(c.is_recognized());
    }

    #[test]
    fn test_income_priority() {
        let c = Classifier::default().classify("recebi aluguel 100");
        assert_eq!(c.kind, TransactionKind::Income);
        assert_eq!(c.amount, Some(dec!(100)));
    }

    #[test]
    fn test_unrecognized_without_amount() {
        let c = Classifier::default().classify("salário do mês");
        assert!(c.amount.is_none());
        assert!(!c.is_recognized());
    }

    #[test]
    fn test_zero_amount_not_recognized() {
        assert!(!Classifier::default().classify("lanche 0").is_recognized());
    }

    #[tokio::test]
    async fn test_escalation_fills_missing_amount() {
        let oracle = MockOracle::new();
        let classifier = Classifier::default().with_oracle(Arc::new(oracle.clone()));

        let c = classifier
            .classify_with_escalation("gastei cinquenta no cinema")
            .await;
        assert_eq!(c.amount, Some(dec!(50)));
        assert_eq!(c.category, "Leisure");
        assert_eq!(c.detected_by, DetectedBy::Oracle);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_escalation_when_amount_found() {
        let oracle = MockOracle::new();
        let classifier = Classifier::default().with_oracle(Arc::new(oracle.clone()));

        let c = classifier.classify_with_escalation("R$ 20 lanche").await;
        assert_eq!(c.detected_by, DetectedBy::Rule);
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_low_confidence_escalation_threshold() {
        let oracle = MockOracle::with_response(OracleClassification {
            amount: Some(dec!(20)),
            category: "clothing".into(),
            kind: TransactionKind::VariableExpense,
            description: "meias".into(),
            confidence: 0.95,
        });
        let config = ClassifierConfig {
            escalate_below_confidence: Some(0.65),
            ..ClassifierConfig::default()
        };
        let classifier = Classifier::new(config).with_oracle(Arc::new(oracle.clone()));

        // Default category scores 0.6, below the threshold
        let c = classifier.classify_with_escalation("meias 20").await;
        assert_eq!(oracle.calls(), 1);
        assert_eq!(c.category, "Clothing");
        assert_eq!(c.detected_by, DetectedBy::Oracle);
    }

    #[tokio::test]
    async fn test_oracle_answer_at_threshold_is_ignored() {
        let oracle = MockOracle::with_response(OracleClassification {
            amount: Some(dec!(99)),
            category: "Food".into(),
            kind: TransactionKind::VariableExpense,
            description: "x".into(),
            confidence: 0.7,
        });
        let classifier = Classifier::default().with_oracle(Arc::new(oracle));

        let c = classifier.classify_with_escalation("almoço sem valor").await;
        assert!(c.amount.is_none());
        assert_eq!(c.detected_by, DetectedBy::Rule);
    }

    #[tokio::test]
    async fn test_oracle_failure_falls_back() {
        let classifier =
            Classifier::default().with_oracle(Arc::new(MockOracle::failing("connection refused")));
        let c = classifier.classify_with_escalation("almoço").await;
        assert_eq!(c.detected_by, DetectedBy::Rule);
        assert_eq!(c.category, "Food");
        assert!(c.amount.is_none());
    }

    #[tokio::test]
    async fn test_oracle_timeout_falls_back() {
        let config = ClassifierConfig {
            oracle_timeout_secs: 1,
            ..ClassifierConfig::default()
        };
        let classifier = Classifier::new(config).with_oracle(Arc::new(MockOracle::hanging()));
        let c = classifier.classify_with_escalation("janta").await;
        assert_eq!(c.detected_by, DetectedBy::Rule);
        assert!(c.amount.is_none());
    }
}
