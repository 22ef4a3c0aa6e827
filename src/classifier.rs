use crate::models::CategoryRule;

/// Category assignment produced by the first matching rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub classification: String,
    pub main_category: String,
    pub sub_category: String,
}

/// Match a merchant name against keyword rules. Rules are checked in the
/// order given (the store lists them by id) and the first keyword hit wins,
/// so broader rules created earlier shadow narrower ones. Matching is
/// case-sensitive substring containment with no normalization.
///
/// Pure over the rule slice: callers re-read rules from the store per call
/// so rule edits apply to the very next message.
pub fn classify(merchant: &str, rules: &[CategoryRule]) -> Option<Classification> {
    if merchant.is_empty() {
        return None;
    }
    for rule in rules {
        for keyword in rule.merchant_keywords.split(',') {
            let keyword = keyword.trim();
            if !keyword.is_empty() && merchant.contains(keyword) {
                return Some(Classification {
                    classification: rule.classification.clone(),
                    main_category: rule.main_category.clone(),
                    sub_category: rule.sub_category.clone(),
                });
            }
        }
    }
    None
}
