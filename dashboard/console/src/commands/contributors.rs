//! Contributor commands

use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::errors::{ConsoleError, Result};
use crate::models::{Contributor, TolaContributor};
use crate::output::{self, print_success};
use crate::table::{format_inr, matches_query, paginate, trim_number};
use crate::validation::{validate_contributor_update, ContributorUpdateDraft};

/// Contributor subcommands
#[derive(Subcommand)]
pub enum ContributorCommands {
    /// List all contributors
    List {
        /// Filter by contributor or Tola name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// List the contributors of one Tola with their pledges
    Tola {
        /// Tola id or name
        tola: String,
    },

    /// Edit a contributor; unspecified fields keep their current value
    Update {
        /// Contributor ID
        contributor_id: i64,

        /// Tola id or name the contributor belongs to
        #[arg(short, long)]
        tola: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        father_or_spouse_name: Option<String>,

        /// 10-digit mobile number; pass "" to clear
        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        pledge: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct ContributorRow {
    #[tabled(rename = "#")]
    serial: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Tola")]
    tola: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct PledgedContributorRow {
    #[tabled(rename = "#")]
    serial: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Tola")]
    tola: String,
    #[tabled(rename = "Pledges")]
    pledges: String,
}

#[derive(Debug, Serialize, Tabled)]
struct TolaContributorRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Father/Spouse")]
    father_or_spouse_name: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Pledge")]
    pledge: String,
}

impl From<TolaContributor> for TolaContributorRow {
    fn from(c: TolaContributor) -> Self {
        Self {
            id: c.id,
            name: c.name,
            father_or_spouse_name: c.father_or_spouse_name.unwrap_or_else(|| "-".to_string()),
            contact: c.contact.unwrap_or_else(|| "-".to_string()),
            pledge: format_inr(c.pledge_amount),
        }
    }
}

fn tola_name(c: &Contributor) -> String {
    c.tola
        .as_ref()
        .map(|t| t.tola_name.clone())
        .unwrap_or_else(|| "-".to_string())
}

/// Active-year pledges, one per financial year: `"2025: ₹ 1,500"`.
fn pledge_summary(c: &Contributor) -> String {
    let parts: Vec<String> = c
        .active_pledges()
        .map(|p| {
            let year = match &p.financial_year.name {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{year}: {}", format_inr(p.amount))
        })
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

/// Execute a contributor command
pub async fn execute(command: ContributorCommands, ctx: &Context) -> Result<()> {
    match command {
        ContributorCommands::List { search, page } => {
            let contributors = ctx.api.list_contributors().await?;
            let filtered: Vec<Contributor> = contributors
                .into_iter()
                .filter(|c| {
                    let tola = c.tola.as_ref().map(|t| t.tola_name.as_str());
                    matches_query(&search, [Some(c.name.as_str()), tola])
                })
                .collect();
            let page = paginate(&filtered, page, ctx.config.rows_per_page);

            if ctx.is_authenticated() {
                let page = page.map_numbered(|serial, c| PledgedContributorRow {
                    serial,
                    pledges: pledge_summary(&c),
                    tola: tola_name(&c),
                    contact: c.contact.unwrap_or_else(|| "-".to_string()),
                    name: c.name,
                });
                output::print_page(page, ctx.format)
            } else {
                let page = page.map_numbered(|serial, c| ContributorRow {
                    serial,
                    tola: tola_name(&c),
                    contact: c.contact.unwrap_or_else(|| "-".to_string()),
                    name: c.name,
                });
                output::print_page(page, ctx.format)
            }
        }

        ContributorCommands::Tola { tola } => {
            let tola = ctx.resolve_tola(&tola).await?;
            let contributors = ctx.api.list_tola_contributors(tola.id).await?;
            let rows: Vec<TolaContributorRow> = contributors
                .into_iter()
                .map(TolaContributorRow::from)
                .collect();
            output::print_output(rows, ctx.format)
        }

        ContributorCommands::Update {
            contributor_id,
            tola,
            name,
            father_or_spouse_name,
            contact,
            pledge,
        } => {
            let tola = ctx.resolve_tola(&tola).await?;
            let current = ctx
                .api
                .list_tola_contributors(tola.id)
                .await?
                .into_iter()
                .find(|c| c.id == contributor_id)
                .ok_or_else(|| {
                    ConsoleError::NotFound(format!(
                        "Contributor {contributor_id} in {}",
                        tola.tola_name
                    ))
                })?;

            let draft = ContributorUpdateDraft {
                contributor_id: Some(current.id),
                name: name.unwrap_or(current.name),
                father_or_spouse_name: father_or_spouse_name
                    .or(current.father_or_spouse_name)
                    .unwrap_or_default(),
                contact: contact.or(current.contact).unwrap_or_default(),
                pledge_amount: pledge.unwrap_or_else(|| trim_number(current.pledge_amount)),
            };
            let update = validate_contributor_update(&draft).map_err(ConsoleError::Validation)?;

            ctx.api.update_contributor(contributor_id, &update).await?;
            print_success(&format!("Contributor {} updated", update.name));
            Ok(())
        }
    }
}
