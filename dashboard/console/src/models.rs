//! Wire types exchanged with the Chanda REST backend.
//!
//! Field names follow the backend's snake_case JSON exactly. Timestamps are
//! kept as the strings the backend sends; only `payment_date` is ever
//! produced by this crate (see [`crate::submit`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────
// Reference data
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    pub id: i64,
    pub name: String,
}

/// A Tola (sub-village) as returned by `GET /api/v1/tolas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tola {
    pub id: i64,
    #[serde(default)]
    pub village_id: Option<i64>,
    pub tola_name: String,
    #[serde(default)]
    pub tola_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub village: Option<Village>,
}

/// A contributor eligible for a given Tola, with the pledge used to
/// pre-fill the contribution amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TolaContributor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub father_or_spouse_name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub pledge_amount: f64,
}

impl TolaContributor {
    /// `"Name - ₹ 1500"`, the label used in pickers.
    pub fn label(&self) -> String {
        format!("{} - ₹ {}", self.name, self.pledge_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialYear {
    pub id: i64,
    pub name: serde_json::Value,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pledge {
    pub id: i64,
    pub amount: f64,
    pub financial_year: FinancialYear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TolaRef {
    pub id: i64,
    pub tola_name: String,
}

/// A contributor as returned by `GET /api/v1/contributors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub tola_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub tola: Option<TolaRef>,
    #[serde(default)]
    pub pledges: Vec<Pledge>,
}

impl Contributor {
    /// Pledges belonging to an active financial year.
    pub fn active_pledges(&self) -> impl Iterator<Item = &Pledge> {
        self.pledges.iter().filter(|p| p.financial_year.is_active)
    }
}

/// Body of `PUT /api/v1/contributors/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorUpdate {
    pub contributor_id: i64,
    pub name: String,
    pub father_or_spouse_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub pledge_amount: f64,
}

// ─────────────────────────────────────────────────────────
// Payment modes
// ─────────────────────────────────────────────────────────

/// The fixed set of payment modes the backend knows, with its ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMode {
    Upi,
    Cash,
    BankTransfer,
    Cheque,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 4] = [Self::Cash, Self::Upi, Self::BankTransfer, Self::Cheque];

    /// Backend `payment_mode_id`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Upi => "1",
            Self::Cash => "2",
            Self::BankTransfer => "3",
            Self::Cheque => "4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Cash => "Cash",
            Self::BankTransfer => "Bank Transfer",
            Self::Cheque => "Cheque",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    /// Accepts either the backend id or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "1" | "upi" => Ok(Self::Upi),
            "2" | "cash" => Ok(Self::Cash),
            "3" | "bank transfer" | "bank" => Ok(Self::BankTransfer),
            "4" | "cheque" | "check" => Ok(Self::Cheque),
            _ => Err(format!("unknown payment mode: {s}")),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Contributions
// ─────────────────────────────────────────────────────────

/// Created contribution, as echoed by `POST /api/v1/contributions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub id: i64,
    pub tola_id: i64,
    #[serde(default)]
    pub contributor_id: Option<i64>,
    pub event_id: i64,
    pub payment_date: String,
    pub amount: f64,
    pub payment_mode_id: serde_json::Value,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Flattened row of `GET /api/v1/contributions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionSummary {
    pub id: i64,
    pub amount: f64,
    pub payment_date: String,
    #[serde(default)]
    pub tola_name: String,
    #[serde(default)]
    pub contributor_name: String,
    #[serde(default)]
    pub payment_mode: String,
    #[serde(default)]
    pub receipt_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentContributor {
    pub contributor_id: i64,
    pub contributor_name: String,
    pub pledged_amount: f64,
    pub paid_amount: f64,
    pub percent_diff: f64,
    #[serde(default)]
    pub tola: Option<TolaRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentsSummary {
    pub total_pledged: f64,
    pub total_paid: f64,
    pub total_percent_diff: f64,
}

/// Reconciliation of pledges against payments for one Tola.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentsResponse {
    #[serde(default)]
    pub contributors: Vec<PaymentContributor>,
    #[serde(default)]
    pub summary: PaymentsSummary,
}

// ─────────────────────────────────────────────────────────
// Expenses
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub financial_year_id: Option<i64>,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expense_type: Option<String>,
    #[serde(default)]
    pub paid_by: Option<String>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub date_of_expense: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /api/v1/expenses` and `PUT /api/v1/expenses/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensePayload {
    pub amount: f64,
    pub description: String,
    pub event_id: i64,
    pub financial_year_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_expense: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Dashboard & auth
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TolaWisePledge {
    pub tola_name: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TolaCollection {
    pub tola_name: String,
    pub total_pledged: f64,
    pub total_collected: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(default)]
    pub contributor_count: u64,
    #[serde(default)]
    pub total_pledge: f64,
    #[serde(default)]
    pub tol_wise_pledge: Vec<TolaWisePledge>,
    #[serde(default)]
    pub total_collected: Option<f64>,
    #[serde(default)]
    pub collected_percent: Option<f64>,
    #[serde(default)]
    pub total_expense: Option<f64>,
    #[serde(default)]
    pub tola_wise_collection: Vec<TolaCollection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_mode_from_id_or_label() {
        assert_eq!("2".parse::<PaymentMode>(), Ok(PaymentMode::Cash));
        assert_eq!("cash".parse::<PaymentMode>(), Ok(PaymentMode::Cash));
        assert_eq!("UPI".parse::<PaymentMode>(), Ok(PaymentMode::Upi));
        assert_eq!(
            "bank-transfer".parse::<PaymentMode>(),
            Ok(PaymentMode::BankTransfer)
        );
        assert_eq!(
            "Bank Transfer".parse::<PaymentMode>(),
            Ok(PaymentMode::BankTransfer)
        );
        assert_eq!("4".parse::<PaymentMode>(), Ok(PaymentMode::Cheque));
        assert!("bitcoin".parse::<PaymentMode>().is_err());
        assert!("".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn payment_mode_ids_match_backend() {
        assert_eq!(PaymentMode::Upi.id(), "1");
        assert_eq!(PaymentMode::Cash.id(), "2");
        assert_eq!(PaymentMode::BankTransfer.id(), "3");
        assert_eq!(PaymentMode::Cheque.id(), "4");
        assert_eq!(PaymentMode::BankTransfer.to_string(), "Bank Transfer");
    }

    #[test]
    fn picker_lists_each_mode_once() {
        let ids: std::collections::HashSet<&str> = PaymentMode::ALL.iter().map(PaymentMode::id).collect();
        assert_eq!(ids.len(), 4);
        for mode in PaymentMode::ALL {
            assert_eq!(mode.label().parse::<PaymentMode>(), Ok(mode));
        }
    }

    #[test]
    fn decode_tola_with_village() {
        let raw = serde_json::json!({
            "id": 3,
            "village_id": 1,
            "tola_name": "North Tola",
            "tola_code": "NT",
            "created_at": "2025-01-01T00:00:00",
            "updated_at": "2025-01-01T00:00:00",
            "village": { "id": 1, "name": "Rampur" }
        });
        let tola: Tola = serde_json::from_value(raw).unwrap();
        assert_eq!(tola.tola_name, "North Tola");
        assert_eq!(tola.village.unwrap().name, "Rampur");
    }

    #[test]
    fn contributor_active_pledges_only() {
        let raw = serde_json::json!({
            "id": 7,
            "name": "Asha Devi",
            "contact": null,
            "tola_id": 3,
            "tola": { "id": 3, "tola_name": "North Tola" },
            "pledges": [
                { "id": 1, "amount": 500.0, "financial_year": { "id": 4, "name": 2024, "is_active": false } },
                { "id": 2, "amount": 750.0, "financial_year": { "id": 5, "name": 2025, "is_active": true } }
            ]
        });
        let contributor: Contributor = serde_json::from_value(raw).unwrap();
        let active: Vec<f64> = contributor.active_pledges().map(|p| p.amount).collect();
        assert_eq!(active, vec![750.0]);
    }

    #[test]
    fn tola_contributor_label() {
        let c = TolaContributor {
            id: 1,
            name: "Ravi".into(),
            father_or_spouse_name: None,
            contact: None,
            pledge_amount: 1500.0,
        };
        assert_eq!(c.label(), "Ravi - ₹ 1500");
    }
}
