use std::collections::HashMap;

// Fixed tokens of the bank SMS format. These are protocol constants of the
// messages themselves, not deployment configuration.
pub const AMOUNT_LABEL: &str = "مبلغ";
pub const MERCHANT_LABEL: &str = "لدى";
pub const CURRENCY_SUFFIX: &str = "SAR";

/// Outcome of pulling amount + merchant out of one SMS. Failure is a value,
/// not an error: malformed messages are routine input and the caller records
/// the raw text either way.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Success { amount: f64, merchant: String },
    Failed,
}

/// Split a raw SMS into label/value pairs: one pair per line, split on the
/// first colon, both sides trimmed. Lines without a colon are skipped and a
/// repeated label keeps its last value.
pub fn parse_lines(raw: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in raw.lines() {
        if let Some((label, value)) = line.split_once(':') {
            fields.insert(label.trim().to_string(), value.trim().to_string());
        }
    }
    fields
}

/// Extract amount and merchant from a raw SMS. Both labels must be present
/// and the amount must parse once the currency suffix is removed; anything
/// else fails as a whole, never as a partial amount-only or merchant-only
/// result.
pub fn extract(raw: &str) -> Extraction {
    let fields = parse_lines(raw);

    let (raw_amount, merchant) = match (fields.get(AMOUNT_LABEL), fields.get(MERCHANT_LABEL)) {
        (Some(amount), Some(merchant)) => (amount, merchant),
        _ => return Extraction::Failed,
    };

    let cleaned = raw_amount.replace(CURRENCY_SUFFIX, "");
    match cleaned.trim().parse::<f64>() {
        Ok(amount) => Extraction::Success {
            amount,
            merchant: merchant.clone(),
        },
        Err(_) => Extraction::Failed,
    }
}
