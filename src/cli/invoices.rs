use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{MasroofError, Result};
use crate::fmt::money;
use crate::settings::get_data_dir;
use crate::store::{self, NewRule};

pub fn list(skip: i64, limit: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let invoices = store::list_invoices(&conn, skip, limit)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Received", "Amount", "Merchant", "Status", "Category"]);
    for invoice in invoices {
        table.add_row(vec![
            Cell::new(invoice.id),
            Cell::new(&invoice.created_at),
            Cell::new(invoice.amount.map(money).unwrap_or_default()),
            Cell::new(invoice.merchant.unwrap_or_default()),
            Cell::new(&invoice.extraction_status),
            Cell::new(invoice.main_category.unwrap_or_default()),
        ]);
    }
    println!("Invoices\n{table}");
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let invoice = store::get_invoice(&conn, id)?
        .ok_or_else(|| MasroofError::Other(format!("No invoice with ID {id}")))?;

    println!("Invoice {}", invoice.id);
    println!("  Received:       {}", invoice.created_at);
    println!("  Status:         {}", invoice.extraction_status);
    println!(
        "  Amount:         {}",
        invoice.amount.map(money).unwrap_or_else(|| "—".to_string())
    );
    println!(
        "  Merchant:       {}",
        invoice.merchant.as_deref().unwrap_or("—")
    );
    println!(
        "  Classification: {}",
        invoice.classification.as_deref().unwrap_or("—")
    );
    println!(
        "  Category:       {} / {}",
        invoice.main_category.as_deref().unwrap_or("—"),
        invoice.sub_category.as_deref().unwrap_or("—")
    );
    println!("  Raw SMS:");
    for line in invoice.raw_sms.lines() {
        println!("    {line}");
    }
    Ok(())
}

pub fn recategorize(
    id: i64,
    classification: &str,
    main_category: &str,
    sub_category: &str,
    create_rule: bool,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let invoice = store::get_invoice(&conn, id)?
        .ok_or_else(|| MasroofError::Other(format!("No invoice with ID {id}")))?;

    store::update_invoice_classification(&conn, id, classification, main_category, sub_category)?;
    println!("Updated invoice {id}: {classification} / {main_category} / {sub_category}");

    if create_rule {
        match invoice.merchant.as_deref().filter(|m| !m.is_empty()) {
            Some(merchant) => {
                let rule_id = store::insert_rule(
                    &conn,
                    &NewRule {
                        merchant_keywords: merchant,
                        classification,
                        main_category,
                        sub_category,
                        category_limit: None,
                    },
                )?;
                println!("Added rule {rule_id}: '{merchant}' \u{2192} {main_category}");
            }
            None => println!("Invoice has no merchant; rule not created"),
        }
    }
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    if !store::delete_invoice(&conn, id)? {
        return Err(MasroofError::Other(format!("No invoice with ID {id}")));
    }
    println!("Deleted invoice {id}");
    Ok(())
}
