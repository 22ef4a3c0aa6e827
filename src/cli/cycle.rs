use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::budget::{self, CYCLE_LENGTH_DAYS};
use crate::db::get_connection;
use crate::error::{MasroofError, Result};
use crate::fmt::money;
use crate::settings::get_data_dir;

pub fn start(date: Option<String>) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
    let mut conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let cycle = budget::start_new_cycle(&mut conn, &date)?;
    println!("Started cycle {} on {}", cycle.id, cycle.start_date);
    Ok(())
}

pub fn current() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    match budget::current_cycle(&conn)? {
        None => println!("No active cycle. Start one with `masroof cycle start`."),
        Some(c) => {
            println!("Cycle {} (active)", c.id);
            println!("  Started:        {}", c.start_date);
            println!("  Days elapsed:   {}", c.days_elapsed);
            println!(
                "  Days remaining: {} (of {CYCLE_LENGTH_DAYS})",
                c.days_remaining
            );
        }
    }
    Ok(())
}

pub fn history(limit: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let cycles = budget::cycle_history(&conn, limit)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Start", "End", "Active", "Spent"]);
    for cycle in cycles {
        table.add_row(vec![
            Cell::new(cycle.id),
            Cell::new(&cycle.start_date),
            Cell::new(cycle.end_date.as_deref().unwrap_or("—")),
            Cell::new(if cycle.is_active { "yes" } else { "" }),
            Cell::new(money(cycle.total_spent)),
        ]);
    }
    println!("Budget cycles\n{table}");
    Ok(())
}

pub fn analysis(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let a = budget::cycle_analysis(&conn, id)?
        .ok_or_else(|| MasroofError::Other(format!("No cycle with ID {id}")))?;

    let window_end = a.end_date.as_deref().unwrap_or("now");
    println!(
        "Cycle {} — {} to {}{}",
        a.cycle_id,
        a.start_date,
        window_end,
        if a.is_active { " (active)" } else { "" }
    );
    println!("  Total spent:    {}", money(a.total_spent));
    println!("  Total budget:   {}", money(a.total_budget));
    let remaining = money(a.remaining_budget);
    if a.remaining_budget < 0.0 {
        println!("  Remaining:      {}", remaining.red());
    } else {
        println!("  Remaining:      {}", remaining.green());
    }
    println!("  Budget used:    {}%", a.budget_percentage_used);
    println!("  Transactions:   {}", a.transaction_count);
    println!("  Average:        {}", money(a.average_transaction));

    if !a.category_breakdown.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Spent", "Limit", "% of Total", "% of Limit"]);
        for share in &a.category_breakdown {
            table.add_row(vec![
                Cell::new(share.category.as_deref().unwrap_or("(unclassified)")),
                Cell::new(money(share.spent)),
                Cell::new(share.limit.map(money).unwrap_or_default()),
                Cell::new(format!("{}%", share.percentage_of_total)),
                Cell::new(
                    share
                        .percentage_of_limit
                        .map(|p| format!("{p}%"))
                        .unwrap_or_default(),
                ),
            ]);
        }
        println!("\nBy category\n{table}");
    }

    if !a.top_merchants.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Merchant", "Spent"]);
        for m in &a.top_merchants {
            table.add_row(vec![Cell::new(&m.merchant), Cell::new(money(m.spent))]);
        }
        println!("\nTop merchants\n{table}");
    }
    Ok(())
}
