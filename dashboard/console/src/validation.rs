//! # Validation
//!
//! Declarative rules for the three forms the console submits: contributions,
//! expenses and contributor updates.
//!
//! A contribution is a tagged union over `is_new_contributor`:
//!
//! ```text
//! existing ──► contributor_id >= 1
//! new      ──► contributor_name, father_or_spouse_name non-empty
//! both     ──► receipt_id, payment_date, amount > 0, payment mode, contact pattern
//! ```
//!
//! Only the branch selected by the discriminator is checked. The validated
//! result, [`ValidContribution`], carries a [`ContributorEntry`] so the other
//! branch's fields cannot leak into a submission.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::models::{ContributorUpdate, PaymentMode};

/// Ten-digit Indian mobile number.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid mobile regex"));

pub const MSG_CONTRIBUTOR_REQUIRED: &str = "Contributor is required";
pub const MSG_NAME_REQUIRED: &str = "Contributor name is required";
pub const MSG_FATHER_OR_SPOUSE_REQUIRED: &str = "Father/Spouse name is required";
pub const MSG_INVALID_CONTACT: &str = "Enter a valid 10-digit mobile number";
pub const MSG_RECEIPT_REQUIRED: &str = "Receipt ID is required";
pub const MSG_DATE_REQUIRED: &str = "Payment date is required";
pub const MSG_AMOUNT_POSITIVE: &str = "Amount must be greater than zero";
pub const MSG_PAYMENT_MODE_REQUIRED: &str = "Payment mode is required";

/// Form field identifiers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ContributorId,
    ContributorName,
    FatherOrSpouseName,
    Contact,
    ReceiptId,
    PaymentDate,
    #[serde(rename = "payment_mode_id")]
    PaymentMode,
    Amount,
    Description,
    DateOfExpense,
    PledgeAmount,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContributorId => "contributor_id",
            Self::ContributorName => "contributor_name",
            Self::FatherOrSpouseName => "father_or_spouse_name",
            Self::Contact => "contact",
            Self::ReceiptId => "receipt_id",
            Self::PaymentDate => "payment_date",
            Self::PaymentMode => "payment_mode_id",
            Self::Amount => "amount",
            Self::Description => "description",
            Self::DateOfExpense => "date_of_expense",
            Self::PledgeAmount => "pledge_amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed, human-readable validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn into_result<T>(self, ok: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(ok())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join(", "))
    }
}

// ─────────────────────────────────────────────────────────
// Primitive checks
// ─────────────────────────────────────────────────────────

/// Empty contact is valid; anything else must be a 10-digit mobile number.
pub fn is_valid_contact(contact: &str) -> bool {
    contact.is_empty() || MOBILE_PATTERN.is_match(contact)
}

/// Coerce form input to a number: blank becomes 0, garbage becomes NaN.
pub fn coerce_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// `Some(amount)` when the input coerces to a finite number above zero.
pub fn positive_amount(raw: &str) -> Option<f64> {
    let amount = coerce_amount(raw);
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ─────────────────────────────────────────────────────────
// Contributions
// ─────────────────────────────────────────────────────────

/// In-progress contribution form state, exactly as typed or selected.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionDraft {
    pub is_new_contributor: bool,
    pub contributor_id: Option<i64>,
    pub contributor_name: String,
    pub father_or_spouse_name: String,
    pub contact: String,
    pub receipt_id: String,
    pub payment_date: Option<NaiveDate>,
    pub amount: String,
    pub payment_mode: String,
}

impl ContributionDraft {
    /// A fresh draft: existing-contributor mode, dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            is_new_contributor: false,
            contributor_id: None,
            contributor_name: String::new(),
            father_or_spouse_name: String::new(),
            contact: String::new(),
            receipt_id: String::new(),
            payment_date: Some(today),
            amount: "0".to_string(),
            payment_mode: String::new(),
        }
    }
}

/// Which contributor a contribution is for.
#[derive(Debug, Clone, PartialEq)]
pub enum ContributorEntry {
    Existing {
        contributor_id: i64,
    },
    New {
        contributor_name: String,
        father_or_spouse_name: String,
    },
}

impl ContributorEntry {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New { .. })
    }
}

/// A contribution that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidContribution {
    pub contributor: ContributorEntry,
    pub contact: Option<String>,
    pub receipt_id: String,
    pub payment_date: NaiveDate,
    pub amount: f64,
    pub payment_mode: PaymentMode,
}

pub fn validate_contribution(draft: &ContributionDraft) -> Result<ValidContribution, FieldErrors> {
    let mut errors = FieldErrors::new();

    let contributor = if draft.is_new_contributor {
        let name = required(&draft.contributor_name);
        let father = required(&draft.father_or_spouse_name);
        if name.is_none() {
            errors.insert(Field::ContributorName, MSG_NAME_REQUIRED);
        }
        if father.is_none() {
            errors.insert(Field::FatherOrSpouseName, MSG_FATHER_OR_SPOUSE_REQUIRED);
        }
        name.zip(father)
            .map(|(contributor_name, father_or_spouse_name)| ContributorEntry::New {
                contributor_name,
                father_or_spouse_name,
            })
    } else {
        match draft.contributor_id {
            Some(id) if id >= 1 => Some(ContributorEntry::Existing { contributor_id: id }),
            _ => {
                errors.insert(Field::ContributorId, MSG_CONTRIBUTOR_REQUIRED);
                None
            }
        }
    };

    let contact = draft.contact.as_str();
    if !is_valid_contact(contact) {
        errors.insert(Field::Contact, MSG_INVALID_CONTACT);
    }

    let receipt_id = required(&draft.receipt_id);
    if receipt_id.is_none() {
        errors.insert(Field::ReceiptId, MSG_RECEIPT_REQUIRED);
    }

    if draft.payment_date.is_none() {
        errors.insert(Field::PaymentDate, MSG_DATE_REQUIRED);
    }

    let amount = positive_amount(&draft.amount);
    if amount.is_none() {
        errors.insert(Field::Amount, MSG_AMOUNT_POSITIVE);
    }

    let payment_mode = draft.payment_mode.parse::<PaymentMode>().ok();
    if payment_mode.is_none() {
        errors.insert(Field::PaymentMode, MSG_PAYMENT_MODE_REQUIRED);
    }

    match (contributor, receipt_id, draft.payment_date, amount, payment_mode) {
        (Some(contributor), Some(receipt_id), Some(payment_date), Some(amount), Some(mode))
            if errors.is_empty() =>
        {
            Ok(ValidContribution {
                contributor,
                contact: (!contact.is_empty()).then(|| contact.to_string()),
                receipt_id,
                payment_date,
                amount,
                payment_mode: mode,
            })
        }
        _ => Err(errors),
    }
}

// ─────────────────────────────────────────────────────────
// Expenses
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub description: String,
    pub expense_type: Option<String>,
    pub paid_by: Option<String>,
    pub approved_by: Option<String>,
    pub payment_mode: Option<String>,
    pub date_of_expense: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidExpense {
    pub amount: f64,
    pub description: String,
    pub expense_type: Option<String>,
    pub paid_by: Option<String>,
    pub approved_by: Option<String>,
    pub payment_mode: Option<String>,
    pub date_of_expense: Option<NaiveDate>,
}

pub fn validate_expense(draft: &ExpenseDraft) -> Result<ValidExpense, FieldErrors> {
    let mut errors = FieldErrors::new();

    let amount = positive_amount(&draft.amount);
    if amount.is_none() {
        errors.insert(Field::Amount, "Amount must be greater than 0");
    }
    let description = required(&draft.description);
    if description.is_none() {
        errors.insert(Field::Description, "Description is required");
    }

    let optional = |v: &Option<String>| v.as_deref().and_then(required);
    errors.into_result(|| ValidExpense {
        amount: amount.unwrap_or_default(),
        description: description.unwrap_or_default(),
        expense_type: optional(&draft.expense_type),
        paid_by: optional(&draft.paid_by),
        approved_by: optional(&draft.approved_by),
        payment_mode: optional(&draft.payment_mode),
        date_of_expense: draft.date_of_expense,
    })
}

// ─────────────────────────────────────────────────────────
// Contributor updates
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributorUpdateDraft {
    pub contributor_id: Option<i64>,
    pub name: String,
    pub father_or_spouse_name: String,
    pub contact: String,
    pub pledge_amount: String,
}

pub fn validate_contributor_update(
    draft: &ContributorUpdateDraft,
) -> Result<ContributorUpdate, FieldErrors> {
    let mut errors = FieldErrors::new();

    let id = draft.contributor_id.filter(|id| *id >= 1);
    if id.is_none() {
        errors.insert(Field::ContributorId, MSG_CONTRIBUTOR_REQUIRED);
    }
    let name = required(&draft.name);
    if name.is_none() {
        errors.insert(Field::ContributorName, "Name is required");
    }
    let father = required(&draft.father_or_spouse_name);
    if father.is_none() {
        errors.insert(Field::FatherOrSpouseName, MSG_FATHER_OR_SPOUSE_REQUIRED);
    }
    let contact = draft.contact.as_str();
    if !is_valid_contact(contact) {
        errors.insert(Field::Contact, MSG_INVALID_CONTACT);
    }
    let pledge = positive_amount(&draft.pledge_amount);
    if pledge.is_none() {
        errors.insert(Field::PledgeAmount, "Pledge amount must be greater than zero");
    }

    errors.into_result(|| ContributorUpdate {
        contributor_id: id.unwrap_or_default(),
        name: name.unwrap_or_default(),
        father_or_spouse_name: father.unwrap_or_default(),
        contact: (!contact.is_empty()).then(|| contact.to_string()),
        pledge_amount: pledge.unwrap_or_default(),
    })
}
