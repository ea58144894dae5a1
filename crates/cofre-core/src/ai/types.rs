//! Types shared by oracle backends

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TransactionKind;

/// Structured answer from a classification oracle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleClassification {
    pub amount: Option<Decimal>,
    pub category: String,
    pub kind: TransactionKind,
    pub description: String,
    /// Self-reported, clamped to [0, 1]
    pub confidence: f64,
}

/// Raw JSON shape requested by the classify_message prompt
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawOracleClassification {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Where an oracle backend points, for status output
#[derive(Debug, Clone, Serialize)]
pub struct OracleInfo {
    pub backend: &'static str,
    pub host: String,
    pub model: String,
}
