use std::io::Read;

use chrono::NaiveDateTime;
use colored::Colorize;

use crate::db::get_connection;
use crate::error::{MasroofError, Result};
use crate::fmt::money;
use crate::ingestor;
use crate::models::STATUS_SUCCESS;
use crate::settings::get_data_dir;
use crate::store::STAMP_FORMAT;

pub fn run(message: Option<String>, received_at: Option<&str>) -> Result<()> {
    if let Some(stamp) = received_at {
        if NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).is_err() {
            return Err(MasroofError::InvalidDate {
                value: stamp.to_string(),
                expected: "YYYY-MM-DD HH:MM:SS",
            });
        }
    }

    let raw = match message {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let conn = get_connection(&get_data_dir().join("masroof.db"))?;
    let invoice = ingestor::ingest_sms(&conn, &raw, received_at)?;

    if invoice.extraction_status == STATUS_SUCCESS {
        if let (Some(amount), Some(merchant)) = (invoice.amount, invoice.merchant.as_deref()) {
            println!(
                "Recorded invoice {}: {} at {}",
                invoice.id,
                money(amount),
                merchant
            );
        }
        match (&invoice.classification, &invoice.main_category, &invoice.sub_category) {
            (Some(classification), Some(main), Some(sub)) => {
                println!("Classified: {classification} / {main} / {sub}");
            }
            _ => println!(
                "{}",
                "No rule matched — correct it with `masroof invoices recategorize`".yellow()
            ),
        }
    } else {
        println!(
            "Recorded invoice {} — extraction failed, raw text kept",
            invoice.id
        );
    }
    Ok(())
}
