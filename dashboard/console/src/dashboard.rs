//! Collection progress for the dashboard summary.

use serde::Serialize;

use crate::models::{DashboardResponse, TolaCollection};
use crate::table::{Badge, Tone};

/// `round(collected / pledged * 100)`, or 0 when nothing is pledged.
pub fn collection_percent(pledged: f64, collected: f64) -> i64 {
    if pledged > 0.0 {
        (collected / pledged * 100.0).round() as i64
    } else {
        0
    }
}

pub fn collection_status(percent: i64) -> Badge {
    let text = if percent == 100 {
        "✔ Fully Collected".to_string()
    } else {
        format!("{percent}% Collected")
    };
    let tone = if percent >= 100 {
        Tone::Good
    } else if percent > 0 {
        Tone::Info
    } else {
        Tone::Bad
    };
    Badge { text, tone }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TolaProgress {
    pub tola_name: String,
    pub pledged: f64,
    pub collected: f64,
    pub percent: i64,
}

impl From<&TolaCollection> for TolaProgress {
    fn from(row: &TolaCollection) -> Self {
        Self {
            tola_name: row.tola_name.clone(),
            pledged: row.total_pledged,
            collected: row.total_collected,
            percent: collection_percent(row.total_pledged, row.total_collected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub tolas: Vec<TolaProgress>,
    pub total_pledged: f64,
    pub total_collected: f64,
    pub percent: i64,
}

impl CollectionSummary {
    /// Per-Tola progress plus grand totals.
    ///
    /// Totals come from the backend when it reports them and are summed
    /// from the Tola rows otherwise.
    pub fn from_response(response: &DashboardResponse) -> Self {
        let tolas: Vec<TolaProgress> = response
            .tola_wise_collection
            .iter()
            .map(TolaProgress::from)
            .collect();

        let row_pledged: f64 = tolas.iter().map(|t| t.pledged).sum();
        let row_collected: f64 = tolas.iter().map(|t| t.collected).sum();

        let total_pledged = if response.total_pledge > 0.0 {
            response.total_pledge
        } else {
            row_pledged
        };
        let total_collected = response.total_collected.unwrap_or(row_collected);

        Self {
            tolas,
            total_pledged,
            total_collected,
            percent: collection_percent(total_pledged, total_collected),
        }
    }
}
