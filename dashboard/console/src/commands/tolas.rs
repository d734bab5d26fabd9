//! Tola listing

use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::errors::Result;
use crate::models::Tola;
use crate::output;

#[derive(Debug, Serialize, Tabled)]
struct TolaRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Tola")]
    name: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Village")]
    village: String,
}

impl From<Tola> for TolaRow {
    fn from(t: Tola) -> Self {
        Self {
            id: t.id,
            name: t.tola_name,
            code: t.tola_code.unwrap_or_else(|| "-".to_string()),
            village: t.village.map(|v| v.name).unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub async fn execute(ctx: &Context) -> Result<()> {
    let tolas = ctx.api.list_tolas().await?;
    let rows: Vec<TolaRow> = tolas.into_iter().map(TolaRow::from).collect();
    output::print_output(rows, ctx.format)
}
