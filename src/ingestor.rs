use rusqlite::Connection;

use crate::classifier;
use crate::error::{MasroofError, Result};
use crate::extractor::{self, Extraction};
use crate::models::{Invoice, STATUS_FAILED, STATUS_SUCCESS};
use crate::store::{self, NewInvoice};

/// Run one SMS through extract, classify, record. Every message is
/// persisted, including ones that fail extraction: the raw text is the
/// audit trail.
pub fn ingest_sms(conn: &Connection, raw: &str, received_at: Option<&str>) -> Result<Invoice> {
    let (amount, merchant, status) = match extractor::extract(raw) {
        Extraction::Success { amount, merchant } => (Some(amount), Some(merchant), STATUS_SUCCESS),
        Extraction::Failed => (None, None, STATUS_FAILED),
    };

    // Rules are re-read per message so edits apply to the next ingest.
    let classification = match merchant.as_deref() {
        Some(m) => classifier::classify(m, &store::list_rules(conn)?),
        None => None,
    };

    let id = store::insert_invoice(
        conn,
        &NewInvoice {
            amount,
            merchant: merchant.as_deref(),
            raw_sms: raw,
            extraction_status: status,
            classification: classification.as_ref().map(|c| c.classification.as_str()),
            main_category: classification.as_ref().map(|c| c.main_category.as_str()),
            sub_category: classification.as_ref().map(|c| c.sub_category.as_str()),
            created_at: received_at,
        },
    )?;

    store::get_invoice(conn, id)?
        .ok_or_else(|| MasroofError::Other(format!("Invoice {id} missing after insert")))
}
