//! JSON parsing helpers for oracle responses
//!
//! Models often wrap the JSON payload in extra prose, so the payload is taken
//! from the first `{` to the last `}`.

use crate::error::{Error, Result};
use crate::models::TransactionKind;

use super::types::{OracleClassification, RawOracleClassification};

/// Longest raw excerpt quoted in error messages
const EXCERPT_LEN: usize = 200;

/// Extract the JSON object embedded in a model response
pub fn extract_json(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::Oracle(format!(
            "No JSON found in oracle response | Raw: {}",
            excerpt(response)
        ))),
    }
}

/// Parse a classify_message answer
pub fn parse_oracle_classification(response: &str) -> Result<OracleClassification> {
    let json_str = extract_json(response)?;
    let raw: RawOracleClassification = serde_json::from_str(json_str).map_err(|e| {
        Error::Oracle(format!(
            "Invalid JSON from oracle: {} | Raw: {}",
            e,
            excerpt(json_str)
        ))
    })?;

    let kind = raw
        .kind
        .as_deref()
        .ok_or_else(|| Error::Oracle("Oracle response has no kind".into()))?
        .parse::<TransactionKind>()
        .map_err(Error::Oracle)?;

    let category = raw
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::Oracle("Oracle response has no category".into()))?;

    Ok(OracleClassification {
        amount: raw.amount,
        category,
        kind,
        description: raw
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_default(),
        confidence: raw.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
    })
}

fn excerpt(s: &str) -> String {
    if s.chars().count() > EXCERPT_LEN {
        let cut: String = s.chars().take(EXCERPT_LEN).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_with_surrounding_text() {
        let response = r#"Sure! {"amount": 45.5, "category": "Food", "kind": "variable_expense", "description": "almoço", "confidence": 0.92} Hope that helps."#;
        let parsed = parse_oracle_classification(response).unwrap();
        assert_eq!(parsed.amount, Some(dec!(45.5)));
        assert_eq!(parsed.kind, TransactionKind::VariableExpense);
        assert_eq!(parsed.category, "Food");
        assert_eq!(parsed.description, "almoço");
        assert!((parsed.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_accepts_string_amount_and_alias_kind() {
        let response = r#"{"amount": "120.00", "category": "Salary", "kind": "renda", "confidence": 1.4}"#;
        let parsed = parse_oracle_classification(response).unwrap();
        assert_eq!(parsed.amount, Some(dec!(120.00)));
        assert_eq!(parsed.kind, TransactionKind::Income);
        assert_eq!(parsed.confidence, 1.0);
    }

    #[test]
    fn test_parse_null_amount() {
        let response = r#"{"amount": null, "category": "Food", "kind": "variable_expense", "confidence": 0.3}"#;
        let parsed = parse_oracle_classification(response).unwrap();
        assert!(parsed.amount.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_json() {
        assert!(matches!(
            parse_oracle_classification("I could not understand that"),
            Err(Error::Oracle(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let response = r#"{"amount": 10, "category": "Food", "kind": "refund", "confidence": 0.9}"#;
        assert!(parse_oracle_classification(response).is_err());
    }
}
