//! Message intake commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cofre_core::{Classifier, Database, Intake, RecordOutcome};

use super::format_money;

/// Classify a message and store it as a transaction
pub async fn cmd_record(
    db: &Database,
    classifier: Classifier,
    owner_id: i64,
    message: &str,
    date: NaiveDate,
) -> Result<RecordOutcome> {
    let intake = Intake::new(db.clone(), classifier);
    let outcome = intake
        .record_message(owner_id, message, date)
        .await
        .context("Failed to record message")?;

    match &outcome {
        RecordOutcome::Recorded {
            transaction,
            confidence,
        } => {
            println!("✅ Recorded transaction {}", transaction.id);
            println!("   Amount:      {}", format_money(transaction.amount));
            println!("   Kind:        {}", transaction.kind.label());
            println!("   Category:    {}", transaction.category);
            println!("   Description: {}", transaction.description);
            println!("   Date:        {}", transaction.occurred_on);
            println!(
                "   Detected by: {} ({:.0}% confidence)",
                transaction.detected_by,
                confidence * 100.0
            );
        }
        RecordOutcome::Unrecognized { message, reason } => {
            println!("🤔 Could not record \"{}\": {}", message, reason);
            println!("   Include an amount, e.g. \"R$ 45,50 almoço\" or \"uber 23,90\".");
        }
    }

    Ok(outcome)
}

/// Show the classification of a message without storing it
pub async fn cmd_classify(classifier: &Classifier, message: &str) -> Result<()> {
    let classification = classifier.classify_with_escalation(message.trim()).await;

    println!();
    println!("🔍 Classification");
    println!("   ─────────────────────────────");
    match classification.amount {
        Some(amount) => println!("   Amount:      {}", format_money(amount)),
        None => println!("   Amount:      (none found)"),
    }
    println!("   Kind:        {}", classification.kind.label());
    println!("   Category:    {}", classification.category);
    println!("   Description: {}", classification.description);
    println!(
        "   Confidence:  {:.0}% ({})",
        classification.confidence * 100.0,
        classification.detected_by
    );

    if !classification.is_recognized() {
        println!();
        println!("   ⚠️  This message would not be recorded: no positive amount.");
    }

    Ok(())
}
