use chrono::Local;
use rusqlite::Connection;

use crate::error::{MasroofError, Result};
use crate::models::{BudgetCycle, CategoryRule, Invoice};

/// Timestamp format used for invoice created_at and cycle boundaries.
/// Fixed-width so string comparison orders chronologically.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp_now() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub struct NewRule<'a> {
    pub merchant_keywords: &'a str,
    pub classification: &'a str,
    pub main_category: &'a str,
    pub sub_category: &'a str,
    pub category_limit: Option<f64>,
}

fn rule_from_row(row: &rusqlite::Row) -> rusqlite::Result<CategoryRule> {
    Ok(CategoryRule {
        id: row.get(0)?,
        merchant_keywords: row.get(1)?,
        classification: row.get(2)?,
        main_category: row.get(3)?,
        sub_category: row.get(4)?,
        category_limit: row.get(5)?,
    })
}

pub fn insert_rule(conn: &Connection, rule: &NewRule) -> Result<i64> {
    if rule.merchant_keywords.trim().is_empty() {
        return Err(MasroofError::Other(
            "Rule needs at least one keyword".to_string(),
        ));
    }
    conn.execute(
        "INSERT INTO category_rules (merchant_keywords, classification, main_category, sub_category, category_limit) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            rule.merchant_keywords,
            rule.classification,
            rule.main_category,
            rule.sub_category,
            rule.category_limit
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All rules in match order. Insertion (id) order is the match order the
/// classifier relies on, so it must stay stable.
pub fn list_rules(conn: &Connection) -> Result<Vec<CategoryRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, merchant_keywords, classification, main_category, sub_category, category_limit \
         FROM category_rules ORDER BY id",
    )?;
    let rules = stmt
        .query_map([], rule_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

pub fn get_rule(conn: &Connection, id: i64) -> Result<Option<CategoryRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, merchant_keywords, classification, main_category, sub_category, category_limit \
         FROM category_rules WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map([id], rule_from_row)?;
    Ok(rows.next().transpose()?)
}

/// Lowest-id rule carrying the given main category. Limits are configured
/// per rule, so when several rules share a category the earliest one is
/// authoritative.
pub fn get_rule_by_category(conn: &Connection, main_category: &str) -> Result<Option<CategoryRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, merchant_keywords, classification, main_category, sub_category, category_limit \
         FROM category_rules WHERE main_category = ?1 ORDER BY id LIMIT 1",
    )?;
    let mut rows = stmt.query_map([main_category], rule_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn update_rule(conn: &Connection, id: i64, rule: &NewRule) -> Result<bool> {
    if rule.merchant_keywords.trim().is_empty() {
        return Err(MasroofError::Other(
            "Rule needs at least one keyword".to_string(),
        ));
    }
    let updated = conn.execute(
        "UPDATE category_rules SET merchant_keywords = ?1, classification = ?2, \
         main_category = ?3, sub_category = ?4, category_limit = ?5 WHERE id = ?6",
        rusqlite::params![
            rule.merchant_keywords,
            rule.classification,
            rule.main_category,
            rule.sub_category,
            rule.category_limit,
            id
        ],
    )?;
    Ok(updated > 0)
}

pub fn delete_rule(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM category_rules WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

pub fn list_main_categories(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT main_category FROM category_rules \
         WHERE main_category <> '' ORDER BY main_category",
    )?;
    let categories = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(categories)
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

pub struct NewInvoice<'a> {
    pub amount: Option<f64>,
    pub merchant: Option<&'a str>,
    pub raw_sms: &'a str,
    pub extraction_status: &'a str,
    pub classification: Option<&'a str>,
    pub main_category: Option<&'a str>,
    pub sub_category: Option<&'a str>,
    /// Explicit received timestamp for backfills; defaults to now.
    pub created_at: Option<&'a str>,
}

fn invoice_from_row(row: &rusqlite::Row) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: row.get(0)?,
        amount: row.get(1)?,
        merchant: row.get(2)?,
        raw_sms: row.get(3)?,
        extraction_status: row.get(4)?,
        classification: row.get(5)?,
        main_category: row.get(6)?,
        sub_category: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const INVOICE_COLUMNS: &str = "id, amount, merchant, raw_sms, extraction_status, \
     classification, main_category, sub_category, created_at";

pub fn insert_invoice(conn: &Connection, invoice: &NewInvoice) -> Result<i64> {
    let created_at = match invoice.created_at {
        Some(stamp) => stamp.to_string(),
        None => timestamp_now(),
    };
    conn.execute(
        "INSERT INTO invoices (amount, merchant, raw_sms, extraction_status, \
         classification, main_category, sub_category, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            invoice.amount,
            invoice.merchant,
            invoice.raw_sms,
            invoice.extraction_status,
            invoice.classification,
            invoice.main_category,
            invoice.sub_category,
            created_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_invoice(conn: &Connection, id: i64) -> Result<Option<Invoice>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"))?;
    let mut rows = stmt.query_map([id], invoice_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn list_invoices(conn: &Connection, skip: i64, limit: i64) -> Result<Vec<Invoice>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices \
         ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
    ))?;
    let invoices = stmt
        .query_map([limit, skip], invoice_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(invoices)
}

/// Human correction of the three classification fields. The rest of the
/// record is immutable once written.
pub fn update_invoice_classification(
    conn: &Connection,
    id: i64,
    classification: &str,
    main_category: &str,
    sub_category: &str,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE invoices SET classification = ?1, main_category = ?2, sub_category = ?3 \
         WHERE id = ?4",
        rusqlite::params![classification, main_category, sub_category, id],
    )?;
    Ok(updated > 0)
}

pub fn delete_invoice(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM invoices WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

// ---------------------------------------------------------------------------
// Budget cycles
// ---------------------------------------------------------------------------

fn cycle_from_row(row: &rusqlite::Row) -> rusqlite::Result<BudgetCycle> {
    Ok(BudgetCycle {
        id: row.get(0)?,
        start_date: row.get(1)?,
        end_date: row.get(2)?,
        is_active: row.get::<_, i64>(3)? != 0,
    })
}

pub fn create_cycle(conn: &Connection, start_date: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO budget_cycles (start_date, is_active) VALUES (?1, 1)",
        [start_date],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_cycle(conn: &Connection, id: i64) -> Result<Option<BudgetCycle>> {
    let mut stmt = conn.prepare(
        "SELECT id, start_date, end_date, is_active FROM budget_cycles WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map([id], cycle_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn get_active_cycle(conn: &Connection) -> Result<Option<BudgetCycle>> {
    let mut stmt = conn.prepare(
        "SELECT id, start_date, end_date, is_active FROM budget_cycles \
         WHERE is_active = 1 ORDER BY id LIMIT 1",
    )?;
    let mut rows = stmt.query_map([], cycle_from_row)?;
    Ok(rows.next().transpose()?)
}

/// Close every active cycle, stamping its end at the given instant.
pub fn deactivate_active_cycles(conn: &Connection, end_stamp: &str) -> Result<usize> {
    let closed = conn.execute(
        "UPDATE budget_cycles SET is_active = 0, end_date = ?1 WHERE is_active = 1",
        [end_stamp],
    )?;
    Ok(closed)
}

pub fn list_cycles(conn: &Connection, limit: i64) -> Result<Vec<BudgetCycle>> {
    let mut stmt = conn.prepare(
        "SELECT id, start_date, end_date, is_active FROM budget_cycles \
         ORDER BY start_date DESC LIMIT ?1",
    )?;
    let cycles = stmt
        .query_map([limit], cycle_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(cycles)
}
