use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{MasroofError, Result};
use crate::fmt::money;
use crate::settings::get_data_dir;
use crate::store::{self, NewRule};

pub fn add(
    keywords: &str,
    classification: &str,
    main_category: &str,
    sub_category: &str,
    limit: Option<f64>,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let id = store::insert_rule(
        &conn,
        &NewRule {
            merchant_keywords: keywords,
            classification,
            main_category,
            sub_category,
            category_limit: limit,
        },
    )?;
    println!("Added rule {id}: '{keywords}' \u{2192} {main_category}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let rules = store::list_rules(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keywords", "Classification", "Main", "Sub", "Limit"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(rule.merchant_keywords),
            Cell::new(rule.classification),
            Cell::new(rule.main_category),
            Cell::new(rule.sub_category),
            Cell::new(rule.category_limit.map(money).unwrap_or_default()),
        ]);
    }
    println!("Rules (matched top to bottom)\n{table}");
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let rule = store::get_rule(&conn, id)?
        .ok_or_else(|| MasroofError::Other(format!("No rule with ID {id}")))?;

    println!("Rule {}", rule.id);
    println!("  Keywords:       {}", rule.merchant_keywords);
    println!("  Classification: {}", rule.classification);
    println!("  Category:       {} / {}", rule.main_category, rule.sub_category);
    println!(
        "  Limit:          {}",
        rule.category_limit.map(money).unwrap_or_else(|| "—".to_string())
    );
    Ok(())
}

pub fn update(
    id: i64,
    keywords: Option<&str>,
    classification: Option<&str>,
    main_category: Option<&str>,
    sub_category: Option<&str>,
    limit: Option<f64>,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let existing = store::get_rule(&conn, id)?
        .ok_or_else(|| MasroofError::Other(format!("No rule with ID {id}")))?;

    let merged = NewRule {
        merchant_keywords: keywords.unwrap_or(&existing.merchant_keywords),
        classification: classification.unwrap_or(&existing.classification),
        main_category: main_category.unwrap_or(&existing.main_category),
        sub_category: sub_category.unwrap_or(&existing.sub_category),
        category_limit: limit.or(existing.category_limit),
    };
    store::update_rule(&conn, id, &merged)?;
    println!("Updated rule {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    if !store::delete_rule(&conn, id)? {
        return Err(MasroofError::Other(format!("No rule with ID {id}")));
    }
    println!("Deleted rule {id}");
    Ok(())
}

pub fn categories() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let categories = store::list_main_categories(&conn)?;
    if categories.is_empty() {
        println!("No categories yet. Add rules with `masroof rules add`.");
        return Ok(());
    }
    for category in categories {
        println!("{category}");
    }
    Ok(())
}
