use colored::Colorize;

use crate::budget;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::get_data_dir;
use crate::store;

pub fn limit(category: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let configured = store::get_rule_by_category(&conn, category)?.and_then(|r| r.category_limit);
    match configured {
        Some(limit) => println!("{category}: limit {}", money(limit)),
        None => println!("No limit set for {category}"),
    }
    Ok(())
}

pub fn remaining(category: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    match budget::remaining_limit(&conn, category)? {
        None => println!("No limit set for {category}"),
        Some(r) => {
            println!("{}", r.main_category);
            println!("  Limit:     {}", money(r.category_limit));
            println!("  Spent:     {}", money(r.total_spent));
            let formatted = money(r.remaining);
            if r.remaining < 0.0 {
                println!("  Remaining: {}", formatted.red());
            } else {
                println!("  Remaining: {}", formatted.green());
            }
        }
    }
    Ok(())
}

pub fn analysis(category: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let a = budget::category_analysis(&conn, category)?;
    println!("{}", a.main_category);
    println!("  Total spent: {}", money(a.total_spent));
    println!("  Invoices:    {}", a.invoice_count);
    println!("  Average:     {}", money(a.average_spent));
    Ok(())
}
