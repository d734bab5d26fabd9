//! Summary dashboard

use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::dashboard::{collection_status, CollectionSummary};
use crate::errors::Result;
use crate::models::DashboardResponse;
use crate::output::{self, paint, print_fields, render_table, OutputFormat};
use crate::table::format_inr;

#[derive(Debug, Tabled)]
struct PledgeRow {
    #[tabled(rename = "Tola")]
    tola: String,
    #[tabled(rename = "Pledged")]
    pledged: String,
}

#[derive(Debug, Tabled)]
struct ProgressRow {
    #[tabled(rename = "Tola")]
    tola: String,
    #[tabled(rename = "Pledged")]
    pledged: String,
    #[tabled(rename = "Collected")]
    collected: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Serialize)]
struct DashboardView<'a> {
    #[serde(flatten)]
    response: &'a DashboardResponse,
    collection: &'a CollectionSummary,
}

pub async fn execute(ctx: &Context) -> Result<()> {
    let response = ctx.api.dashboard().await?;
    let summary = CollectionSummary::from_response(&response);

    if ctx.format == OutputFormat::Json {
        return output::print_json(&DashboardView {
            response: &response,
            collection: &summary,
        });
    }

    let mut fields = vec![
        ("Event", ctx.config.event_name.clone()),
        ("Contributors", response.contributor_count.to_string()),
        ("Total Pledge", format_inr(response.total_pledge)),
        ("Total Collected", format_inr(summary.total_collected)),
        ("Collection", paint(&collection_status(summary.percent))),
    ];
    if let Some(expense) = response.total_expense {
        fields.push(("Total Expense", format_inr(expense)));
    }
    print_fields(fields);

    if !response.tol_wise_pledge.is_empty() {
        println!();
        let rows: Vec<PledgeRow> = response
            .tol_wise_pledge
            .iter()
            .map(|p| PledgeRow {
                tola: p.tola_name.clone(),
                pledged: format_inr(p.total_amount),
            })
            .collect();
        println!("{}", render_table(rows));
    }

    if !summary.tolas.is_empty() {
        println!();
        let rows: Vec<ProgressRow> = summary
            .tolas
            .iter()
            .map(|t| ProgressRow {
                tola: t.tola_name.clone(),
                pledged: format_inr(t.pledged),
                collected: format_inr(t.collected),
                status: collection_status(t.percent).text,
            })
            .collect();
        println!("{}", render_table(rows));
    }
    Ok(())
}
