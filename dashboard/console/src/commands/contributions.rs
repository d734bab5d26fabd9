//! Contributions table

use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::errors::Result;
use crate::models::ContributionSummary;
use crate::output;
use crate::table::{format_inr, matches_query, paginate};

#[derive(Debug, Clone, Serialize, Tabled)]
struct ContributionRow {
    #[tabled(rename = "#")]
    serial: usize,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Contributor")]
    contributor: String,
    #[tabled(rename = "Tola")]
    tola: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Receipt")]
    receipt: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn matches(c: &ContributionSummary, search: &str) -> bool {
    matches_query(
        search,
        [
            Some(c.contributor_name.as_str()),
            Some(c.tola_name.as_str()),
            c.receipt_id.as_deref(),
        ],
    )
}

pub async fn execute(ctx: &Context, search: String, page: usize) -> Result<()> {
    let contributions = ctx.api.list_contributions().await?;
    let filtered: Vec<ContributionSummary> = contributions
        .into_iter()
        .filter(|c| matches(c, &search))
        .collect();

    let page = paginate(&filtered, page, ctx.config.rows_per_page).map_numbered(|serial, c| {
        ContributionRow {
            serial,
            date: c.payment_date,
            contributor: c.contributor_name,
            tola: c.tola_name,
            mode: c.payment_mode,
            receipt: c.receipt_id.unwrap_or_else(|| "-".to_string()),
            amount: format_inr(c.amount),
        }
    });
    output::print_page(page, ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_covers_name_tola_and_receipt() {
        let c = ContributionSummary {
            id: 1,
            amount: 500.0,
            payment_date: "2025-01-15".into(),
            tola_name: "North Tola".into(),
            contributor_name: "Ravi Kumar".into(),
            payment_mode: "Cash".into(),
            receipt_id: Some("R-1001".into()),
        };
        assert!(matches(&c, "ravi"));
        assert!(matches(&c, "north"));
        assert!(matches(&c, "r-10"));
        assert!(!matches(&c, "south"));
    }
}
