//! Savings goal command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cofre_core::{Database, NewGoal};

use super::{format_money, parse_amount, parse_date, truncate};

/// Raw `goals add` arguments
#[derive(Debug)]
pub struct GoalOptions<'a> {
    pub name: &'a str,
    pub target: &'a str,
    pub current: &'a str,
    pub deadline: Option<&'a str>,
    pub category: Option<&'a str>,
    pub priority: u8,
}

pub fn cmd_goals_add(db: &Database, owner_id: i64, options: &GoalOptions<'_>) -> Result<i64> {
    let goal = NewGoal {
        owner_id,
        name: options.name.trim().to_string(),
        target_amount: parse_amount(options.target)?,
        current_amount: parse_amount(options.current)?,
        deadline: options
            .deadline
            .map(|d| parse_date(d, "--deadline"))
            .transpose()?,
        category: options.category.map(str::to_string),
        priority: options.priority,
    };

    let id = db.create_goal(&goal).context("Failed to create goal")?;

    println!(
        "✅ Created goal {} \"{}\": target {}",
        id,
        goal.name,
        format_money(goal.target_amount)
    );

    Ok(id)
}

pub fn cmd_goals_list(db: &Database, owner_id: i64, include_completed: bool, today: NaiveDate) -> Result<()> {
    let goals = db.list_goals(owner_id, include_completed)?;

    if goals.is_empty() {
        println!("No goals yet. Add one with:");
        println!("  cofre goals add \"Emergency fund\" 10000 --deadline 2025-12-31");
        return Ok(());
    }

    println!();
    println!("🏁 Savings Goals");
    println!("   ─────────────────────────────────────────────────────────────────────");

    for goal in &goals {
        let deadline = match (goal.deadline, goal.days_remaining(today)) {
            (Some(date), Some(days)) => format!("{} ({} days left)", date, days),
            _ => "no deadline".to_string(),
        };
        let status = if goal.is_completed() { " ✅" } else { "" };

        println!(
            "   [{}] P{} {:24} │ {:>12} of {:>12} │ {:>5.1}% │ {}{}",
            goal.id,
            goal.priority,
            truncate(&goal.name, 24),
            format_money(goal.current_amount),
            format_money(goal.target_amount),
            goal.progress_percentage(),
            deadline,
            status
        );
    }

    Ok(())
}

pub fn cmd_goals_progress(db: &Database, id: i64, amount: &str) -> Result<()> {
    let amount = parse_amount(amount)?;
    let goal = db.update_goal_progress(id, amount)?;

    println!(
        "✅ {}: {} of {} ({:.1}%)",
        goal.name,
        format_money(goal.current_amount),
        format_money(goal.target_amount),
        goal.progress_percentage()
    );
    if goal.is_completed() {
        println!("   🎉 Goal reached!");
    } else {
        println!("   {} to go", format_money(goal.remaining_amount()));
    }

    Ok(())
}

pub fn cmd_goals_delete(db: &Database, id: i64) -> Result<()> {
    let goal = db
        .get_goal(id)?
        .ok_or_else(|| anyhow::anyhow!("Goal {} not found", id))?;

    db.delete_goal(id)?;

    println!("🗑️  Deleted goal {} \"{}\"", id, goal.name);

    Ok(())
}
