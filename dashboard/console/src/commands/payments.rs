//! Pledge vs. payment reconciliation for one Tola

use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::errors::Result;
use crate::models::{PaymentContributor, PaymentsSummary};
use crate::output::{self, paint, print_fields, OutputFormat};
use crate::table::{format_rupees, matches_query, paginate, percent_diff_badge, Page};

#[derive(Debug, Clone, Serialize, Tabled)]
struct PaymentRow {
    #[tabled(rename = "#")]
    serial: usize,
    #[tabled(rename = "Contributor")]
    contributor: String,
    #[tabled(rename = "Pledged")]
    pledged: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Difference")]
    difference: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl PaymentRow {
    fn new(serial: usize, p: PaymentContributor) -> Self {
        Self {
            serial,
            pledged: format_rupees(p.pledged_amount),
            paid: format_rupees(p.paid_amount),
            difference: percent_diff_badge(p.percent_diff).text,
            status: if p.paid_amount > 0.0 { "Paid" } else { "Unpaid" },
            contributor: p.contributor_name,
        }
    }
}

#[derive(Serialize)]
struct PaymentsView<'a> {
    tola: &'a str,
    summary: &'a PaymentsSummary,
    contributors: Page<PaymentRow>,
}

pub async fn execute(ctx: &Context, tola: String, search: String, page: usize) -> Result<()> {
    let tola = ctx.resolve_tola(&tola).await?;
    let payments = ctx.api.tola_payments(tola.id).await?;

    let filtered: Vec<PaymentContributor> = payments
        .contributors
        .into_iter()
        .filter(|p| matches_query(&search, [Some(p.contributor_name.as_str())]))
        .collect();
    let page = paginate(&filtered, page, ctx.config.rows_per_page).map_numbered(PaymentRow::new);

    match ctx.format {
        OutputFormat::Json => output::print_json(&PaymentsView {
            tola: &tola.tola_name,
            summary: &payments.summary,
            contributors: page,
        }),
        OutputFormat::Table => {
            let summary = &payments.summary;
            print_fields([
                ("Tola", tola.tola_name.clone()),
                ("Total Pledged", format_rupees(summary.total_pledged)),
                ("Total Paid", format_rupees(summary.total_paid)),
                ("Difference", paint(&percent_diff_badge(summary.total_percent_diff))),
            ]);
            println!();
            output::print_page(page, ctx.format)
        }
    }
}
