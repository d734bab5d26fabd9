//! Contribution form controller.
//!
//! Owns the [`ContributionDraft`] and the errors shown next to each field.
//! Every setter re-runs the schema and refreshes the error of the field it
//! touched; [`ContributionForm::submit`] is the authoritative check.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::TolaContributor;
use crate::validation::{
    validate_contribution, ContributionDraft, Field, FieldErrors, ValidContribution,
};

pub const MSG_SELECT_TOLA: &str = "Please select Tola before submitting";
pub const MSG_INVALID_DATE: &str = "Enter a valid date (YYYY-MM-DD or DD/MM/YYYY)";

/// Why a submit did not produce a [`ValidContribution`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// No Tola selected. Field validity is irrelevant.
    Precondition(&'static str),
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
pub struct ContributionForm {
    draft: ContributionDraft,
    errors: FieldErrors,
    today: NaiveDate,
}

impl ContributionForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            draft: ContributionDraft::new(today),
            errors: FieldErrors::new(),
            today,
        }
    }

    pub fn draft(&self) -> &ContributionDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// Discard everything and start from an empty draft.
    pub fn reset(&mut self) {
        self.draft = ContributionDraft::new(self.today);
        self.errors = FieldErrors::new();
    }

    /// Switch between existing-contributor and new-contributor mode.
    pub fn set_new_contributor(&mut self, is_new: bool) {
        self.draft.is_new_contributor = is_new;
        if is_new {
            self.draft.contributor_id = None;
            self.errors.remove(Field::ContributorId);
        } else {
            self.errors.remove(Field::ContributorName);
            self.errors.remove(Field::FatherOrSpouseName);
        }
    }

    /// Pick an existing contributor. The pledge becomes the default amount;
    /// clearing the pick resets the amount to zero.
    pub fn select_contributor(&mut self, contributor: Option<&TolaContributor>) {
        match contributor {
            Some(c) => {
                debug!("Selected contributor {} (pledge {})", c.id, c.pledge_amount);
                self.draft.contributor_id = Some(c.id);
                self.draft.amount = c.pledge_amount.to_string();
            }
            None => {
                self.draft.contributor_id = None;
                self.draft.amount = "0".to_string();
            }
        }
        self.revalidate(Field::ContributorId);
        self.revalidate(Field::Amount);
    }

    pub fn set_contributor_name(&mut self, value: impl Into<String>) {
        self.draft.contributor_name = value.into();
        self.revalidate(Field::ContributorName);
    }

    pub fn set_father_or_spouse_name(&mut self, value: impl Into<String>) {
        self.draft.father_or_spouse_name = value.into();
        self.revalidate(Field::FatherOrSpouseName);
    }

    pub fn set_contact(&mut self, value: impl Into<String>) {
        self.draft.contact = value.into();
        self.revalidate(Field::Contact);
    }

    pub fn set_receipt_id(&mut self, value: impl Into<String>) {
        self.draft.receipt_id = value.into();
        self.revalidate(Field::ReceiptId);
    }

    pub fn set_payment_date(&mut self, date: Option<NaiveDate>) {
        self.draft.payment_date = date;
        self.revalidate(Field::PaymentDate);
    }

    /// Parse typed date input; an unparseable value clears the date and
    /// records an error for the field.
    pub fn set_payment_date_input(&mut self, input: &str) {
        match parse_date(input) {
            Some(date) => self.set_payment_date(Some(date)),
            None => {
                self.draft.payment_date = None;
                self.errors.insert(Field::PaymentDate, MSG_INVALID_DATE);
            }
        }
    }

    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.draft.amount = value.into();
        self.revalidate(Field::Amount);
    }

    pub fn set_payment_mode(&mut self, value: impl Into<String>) {
        self.draft.payment_mode = value.into();
        self.revalidate(Field::PaymentMode);
    }

    /// Authoritative check before previewing.
    pub fn submit(&mut self, selected_tola: Option<i64>) -> Result<ValidContribution, FormError> {
        if selected_tola.is_none() {
            return Err(FormError::Precondition(MSG_SELECT_TOLA));
        }

        match validate_contribution(&self.draft) {
            Ok(valid) => {
                self.errors = FieldErrors::new();
                Ok(valid)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(FormError::Invalid(errors))
            }
        }
    }

    fn revalidate(&mut self, field: Field) {
        let message = validate_contribution(&self.draft)
            .err()
            .and_then(|errors| errors.get(field).map(str::to_string));
        match message {
            Some(message) => self.errors.insert(field, message),
            None => self.errors.remove(field),
        }
    }
}

/// Accepts `YYYY-MM-DD` and the `DD/MM/YYYY` format shown in previews.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .ok()
}
