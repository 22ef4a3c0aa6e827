/// Extraction outcomes stored on an invoice row.
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";

/// One recorded SMS. The raw text is always kept; amount and merchant are
/// present exactly when extraction_status is "success".
#[derive(Debug, Clone)]
pub struct Invoice {
    pub id: i64,
    pub amount: Option<f64>,
    pub merchant: Option<String>,
    pub raw_sms: String,
    pub extraction_status: String,
    pub classification: Option<String>,
    pub main_category: Option<String>,
    pub sub_category: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub id: i64,
    pub merchant_keywords: String,
    pub classification: String,
    pub main_category: String,
    pub sub_category: String,
    pub category_limit: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BudgetCycle {
    pub id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
}
