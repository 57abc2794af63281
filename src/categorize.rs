use std::fmt;

use serde::Serialize;

use crate::transaction::CanonicalTransaction;

/// Fixed set of spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub(crate) enum Category {
    #[serde(rename = "Airtime & Data")]
    AirtimeData,
    #[serde(rename = "Food & Lifestyle")]
    FoodLifestyle,
    #[serde(rename = "Transfers")]
    Transfers,
    #[serde(rename = "Savings")]
    Savings,
    #[serde(rename = "Gaming & Betting")]
    GamingBetting,
    #[serde(rename = "Cash Withdrawal")]
    CashWithdrawal,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Category::AirtimeData => "Airtime & Data",
            Category::FoodLifestyle => "Food & Lifestyle",
            Category::Transfers => "Transfers",
            Category::Savings => "Savings",
            Category::GamingBetting => "Gaming & Betting",
            Category::CashWithdrawal => "Cash Withdrawal",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Keyword rules checked in order against the lowercased description.
/// Earlier entries win when a description matches more than one rule,
/// e.g. "Transfer to Betking" is a transfer, not betting.
const RULES: &[(Category, &[&str])] = &[
    (Category::AirtimeData, &["airtime", "data"]),
    (Category::FoodLifestyle, &["cold stone", "food", "restaurant"]),
    (Category::Transfers, &["transfer"]),
    (Category::Savings, &["auto-save", "owallet", "piggy", "save"]),
    (Category::GamingBetting, &["bet", "sporty"]),
    (Category::CashWithdrawal, &["atm", "pos", "withdrawal"]),
];

/// Map a transaction description to its spending category.
/// Pure and total: descriptions that match no rule fall through to Other.
pub(crate) fn categorize(description: &str) -> Category {
    let description = description.to_lowercase();
    for (category, keywords) in RULES {
        if keywords.iter().any(|k| description.contains(k)) {
            return *category;
        }
    }

    Category::Other
}

/// Assign a category to every record in place.
pub(crate) fn apply(transactions: &mut [CanonicalTransaction]) {
    for t in transactions.iter_mut() {
        t.category = categorize(&t.description);
    }
}
