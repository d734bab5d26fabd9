//! `chanda collect`: record one contribution.
//!
//! Walks the capture workflow: pick the Tola (its contributors load behind a
//! spinner), fill the draft from flags or prompts, show the preview, and only
//! send after the user confirms.

use std::time::Duration;

use chrono::Local;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::Context;
use crate::errors::{ConsoleError, Result};
use crate::models::PaymentMode;
use crate::output::{self, print_fields, print_info, print_notice, print_warning, OutputFormat};
use crate::workflow::{CaptureSession, EventContext, Notice, MSG_SAVED};

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Tola id or name
    #[arg(short, long)]
    pub tola: String,

    /// Existing contributor ID (prompted for when omitted)
    #[arg(short, long, conflicts_with_all = ["new", "name", "father_or_spouse_name"])]
    pub contributor: Option<i64>,

    /// Record the contribution for a contributor not yet on file
    #[arg(long)]
    pub new: bool,

    /// New contributor's name
    #[arg(long, requires = "new")]
    pub name: Option<String>,

    /// New contributor's father or spouse name
    #[arg(long, requires = "new")]
    pub father_or_spouse_name: Option<String>,

    /// 10-digit mobile number
    #[arg(long)]
    pub contact: Option<String>,

    /// Receipt ID written on the paper receipt
    #[arg(short, long)]
    pub receipt: Option<String>,

    /// Payment date (YYYY-MM-DD or DD/MM/YYYY), defaults to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Payment mode: upi, cash, bank-transfer, cheque (or 1-4)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Amount; defaults to the contributor's pledge
    #[arg(short, long)]
    pub amount: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub async fn execute(args: CollectArgs, ctx: &Context) -> Result<()> {
    let mut session =
        CaptureSession::new(EventContext::from(&ctx.config), Local::now().date_naive());

    if !session.reference_mut().load_tolas(&ctx.api).await {
        return Err(ConsoleError::Precondition(
            "Could not load tolas; check the backend and try again".to_string(),
        ));
    }
    let tola = session
        .reference()
        .find_tola(&args.tola)
        .cloned()
        .ok_or_else(|| ConsoleError::NotFound(format!("Tola '{}'", args.tola)))?;

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Loading contributors of {}...", tola.tola_name));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let loaded = session.select_tola(&ctx.api, Some(tola.id)).await;
    spinner.finish_and_clear();
    if !loaded {
        print_warning("Could not load contributors for this Tola");
    }

    fill_contributor(&mut session, &args)?;

    let form = session.form_mut();
    if let Some(contact) = &args.contact {
        form.set_contact(contact.as_str());
    }
    if let Some(receipt) = &args.receipt {
        form.set_receipt_id(receipt.as_str());
    }
    if let Some(date) = &args.date {
        form.set_payment_date_input(date);
    }
    if let Some(amount) = &args.amount {
        form.set_amount(amount.as_str());
    }
    match &args.mode {
        Some(mode) => form.set_payment_mode(mode.as_str()),
        None if !args.yes => {
            if let Some(mode) = pick_payment_mode()? {
                form.set_payment_mode(mode.id());
            }
        }
        None => {}
    }

    let preview = session.request_preview()?;
    print_info("Please review the contribution before saving:");
    print_fields(preview.rows());

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Save this contribution?")
            .default(false)
            .interact()?;
        if !confirmed {
            session.cancel_preview()?;
            print_warning("Cancelled; nothing was sent");
            return Ok(());
        }
    }

    let record = session.confirm(&ctx.api).await?;
    debug!("Saved contribution {:?}", record);
    print_notice(&Notice::Success(MSG_SAVED.to_string()));
    if ctx.format == OutputFormat::Json {
        output::print_json(&record)?;
    }
    Ok(())
}

fn fill_contributor(session: &mut CaptureSession, args: &CollectArgs) -> Result<()> {
    if args.new {
        let form = session.form_mut();
        form.set_new_contributor(true);
        form.set_contributor_name(args.name.clone().unwrap_or_default());
        form.set_father_or_spouse_name(args.father_or_spouse_name.clone().unwrap_or_default());
        return Ok(());
    }

    let contributor_id = match args.contributor {
        Some(id) => Some(id),
        None => pick_contributor(session)?,
    };
    if !session.select_contributor(contributor_id) {
        return Err(ConsoleError::NotFound(format!(
            "Contributor {} in the selected Tola",
            contributor_id.unwrap_or_default()
        )));
    }
    Ok(())
}

/// Interactive picker over the loaded contributors.
fn pick_contributor(session: &CaptureSession) -> Result<Option<i64>> {
    let contributors = session.reference().contributors();
    if contributors.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = contributors.iter().map(|c| c.label()).collect();
    let choice = dialoguer::Select::new()
        .with_prompt("Contributor")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.and_then(|i| contributors.get(i)).map(|c| c.id))
}

fn pick_payment_mode() -> Result<Option<PaymentMode>> {
    let labels: Vec<&str> = PaymentMode::ALL.iter().map(PaymentMode::label).collect();
    let choice = dialoguer::Select::new()
        .with_prompt("Payment mode")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.and_then(|i| PaymentMode::ALL.get(i).copied()))
}
