//! # Preview/confirm gate
//!
//! Nothing reaches the network until a rendered summary has been
//! explicitly confirmed.
//!
//! ```text
//! Idle ──open──► Previewing ──confirm──► Submitting ──finish──► Idle
//!                    └──────cancel──────────────────────────────►┘
//! ```
//!
//! Cancelling only closes the preview; the form keeps its values. While a
//! submission is in flight the gate refuses to open or confirm again.

use std::fmt;

use thiserror::Error;

use crate::table::format_rupees;
use crate::validation::{ContributorEntry, ValidContribution};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

/// Where the contribution is going and how to label it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewContext {
    pub event_name: String,
    pub tola_id: i64,
    pub tola_name: String,
    /// Display name of the existing contributor, when known.
    pub contributor_label: Option<String>,
}

/// Read-only summary of a validated contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub contribution: ValidContribution,
    pub context: PreviewContext,
}

impl Preview {
    pub fn new(contribution: ValidContribution, context: PreviewContext) -> Self {
        Self {
            contribution,
            context,
        }
    }

    pub fn tola_id(&self) -> i64 {
        self.context.tola_id
    }

    /// Labeled rows in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let c = &self.contribution;
        let mut rows = vec![
            ("Event", self.context.event_name.clone()),
            ("Tola", self.context.tola_name.clone()),
        ];

        match &c.contributor {
            ContributorEntry::Existing { contributor_id } => {
                let label = self
                    .context
                    .contributor_label
                    .clone()
                    .unwrap_or_else(|| format!("#{contributor_id}"));
                rows.push(("Contributor", label));
            }
            ContributorEntry::New {
                contributor_name,
                father_or_spouse_name,
            } => {
                rows.push(("Contributor", format!("{contributor_name} (new)")));
                rows.push(("Father/Spouse Name", father_or_spouse_name.clone()));
            }
        }

        rows.push(("Contact", c.contact.clone().unwrap_or_else(|| "-".to_string())));
        rows.push(("Receipt ID", c.receipt_id.clone()));
        rows.push(("Payment Date", c.payment_date.format("%d/%m/%Y").to_string()));
        rows.push(("Payment Mode", c.payment_mode.label().to_string()));
        rows.push(("Amount", format_rupees(c.amount)));
        rows
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (label, value) in rows {
            writeln!(f, "{label:<width$}  {value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum GateState {
    #[default]
    Idle,
    Previewing(Preview),
    Submitting(Preview),
}

impl GateState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Previewing(_) => "previewing",
            Self::Submitting(_) => "submitting",
        }
    }
}

#[derive(Debug, Default)]
pub struct PreviewGate {
    state: GateState,
}

impl PreviewGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GateState::Idle)
    }

    pub fn preview(&self) -> Option<&Preview> {
        match &self.state {
            GateState::Previewing(p) | GateState::Submitting(p) => Some(p),
            GateState::Idle => None,
        }
    }

    /// `Idle -> Previewing`.
    pub fn open(&mut self, preview: Preview) -> Result<(), GateError> {
        if !self.is_idle() {
            return Err(self.invalid("open a preview"));
        }
        self.state = GateState::Previewing(preview);
        Ok(())
    }

    /// `Previewing -> Idle`. The preview is dropped; the form is untouched.
    pub fn cancel(&mut self) -> Result<(), GateError> {
        match self.state {
            GateState::Previewing(_) => {
                self.state = GateState::Idle;
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// `Previewing -> Submitting`. Returns the confirmed preview to submit.
    pub fn confirm(&mut self) -> Result<Preview, GateError> {
        match std::mem::take(&mut self.state) {
            GateState::Previewing(preview) => {
                self.state = GateState::Submitting(preview.clone());
                Ok(preview)
            }
            other => {
                self.state = other;
                Err(self.invalid("confirm"))
            }
        }
    }

    /// `Submitting -> Idle`, whatever the outcome of the request.
    pub fn finish(&mut self) -> Result<(), GateError> {
        match self.state {
            GateState::Submitting(_) => {
                self.state = GateState::Idle;
                Ok(())
            }
            _ => Err(self.invalid("finish")),
        }
    }

    fn invalid(&self, action: &'static str) -> GateError {
        GateError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMode;
    use chrono::NaiveDate;

    fn preview(entry: ContributorEntry) -> Preview {
        Preview::new(
            ValidContribution {
                contributor: entry,
                contact: None,
                receipt_id: "R-1001".into(),
                payment_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                amount: 500.0,
                payment_mode: PaymentMode::Cash,
            },
            PreviewContext {
                event_name: "Durga Pooja 2025".into(),
                tola_id: 3,
                tola_name: "North Tola".into(),
                contributor_label: None,
            },
        )
    }

    fn new_entry() -> ContributorEntry {
        ContributorEntry::New {
            contributor_name: "Ravi Kumar".into(),
            father_or_spouse_name: "Suresh Kumar".into(),
        }
    }

    #[test]
    fn happy_path() {
        let mut gate = PreviewGate::new();
        gate.open(preview(new_entry())).unwrap();
        assert!(matches!(&gate.state, GateState::Previewing(_)));

        let confirmed = gate.confirm().unwrap();
        assert_eq!(confirmed.tola_id(), 3);
        assert!(matches!(&gate.state, GateState::Submitting(_)));

        gate.finish().unwrap();
        assert!(gate.is_idle());
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut gate = PreviewGate::new();
        gate.open(preview(new_entry())).unwrap();
        gate.cancel().unwrap();
        assert!(gate.is_idle());
        assert!(gate.preview().is_none());
    }

    #[test]
    fn no_double_submit_while_in_flight() {
        let mut gate = PreviewGate::new();
        gate.open(preview(new_entry())).unwrap();
        gate.confirm().unwrap();

        assert_eq!(
            gate.open(preview(new_entry())).unwrap_err(),
            GateError::InvalidTransition {
                action: "open a preview",
                state: "submitting"
            }
        );
        assert!(gate.confirm().is_err());
        assert!(gate.cancel().is_err());
        assert!(matches!(&gate.state, GateState::Submitting(_)));
    }

    #[test]
    fn confirm_requires_a_preview() {
        let mut gate = PreviewGate::new();
        let err = gate.confirm().unwrap_err();
        assert_eq!(err.to_string(), "cannot confirm while idle");
        assert!(gate.finish().is_err());
        assert!(gate.is_idle());
    }

    #[test]
    fn rows_for_new_contributor() {
        let rows = preview(new_entry()).rows();
        let get = |label: &str| {
            rows.iter()
                .find(|(k, _)| *k == label)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("Tola").as_deref(), Some("North Tola"));
        assert_eq!(get("Contributor").as_deref(), Some("Ravi Kumar (new)"));
        assert_eq!(get("Father/Spouse Name").as_deref(), Some("Suresh Kumar"));
        assert_eq!(get("Contact").as_deref(), Some("-"));
        assert_eq!(get("Payment Date").as_deref(), Some("15/01/2025"));
        assert_eq!(get("Payment Mode").as_deref(), Some("Cash"));
        assert_eq!(get("Amount").as_deref(), Some("₹ 500.00"));
    }

    #[test]
    fn rows_for_existing_contributor() {
        let mut p = preview(ContributorEntry::Existing { contributor_id: 9 });
        assert!(p.rows().iter().any(|(k, v)| *k == "Contributor" && v == "#9"));

        p.context.contributor_label = Some("Asha - ₹ 700".into());
        let text = p.to_string();
        assert!(text.contains("Asha - ₹ 700"));
        assert!(!text.contains("Father/Spouse"));
    }
}
