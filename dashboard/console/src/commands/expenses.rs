//! Expense commands

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::config::Config;
use crate::errors::{ConsoleError, Result};
use crate::form::parse_date;
use crate::models::{Expense, ExpensePayload};
use crate::output::{self, paint, print_error, print_fields, print_success, OutputFormat};
use crate::table::{
    format_inr, matches_query, paginate, payment_mode_badge, trim_number, MASKED_AMOUNT,
};
use crate::validation::{validate_expense, ExpenseDraft, Field, FieldErrors, ValidExpense};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List expenses
    List {
        /// Filter by description, paid by, approved by or type
        #[arg(short, long, default_value = "")]
        search: String,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show one expense
    Show {
        /// Expense ID
        id: i64,
    },

    /// Record a new expense
    Add(ExpenseFields),

    /// Edit an expense; unspecified fields keep their current value
    Update {
        /// Expense ID
        id: i64,

        #[command(flatten)]
        fields: ExpenseFields,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct ExpenseFields {
    #[arg(short, long)]
    pub amount: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Expense category
    #[arg(short = 't', long = "type")]
    pub expense_type: Option<String>,

    #[arg(long)]
    pub paid_by: Option<String>,

    #[arg(long)]
    pub approved_by: Option<String>,

    /// Cash, UPI, Bank Transfer or Cheque
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Date of expense (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct ExpenseRow {
    #[tabled(rename = "#")]
    serial: usize,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Type")]
    expense_type: String,
    #[tabled(rename = "Paid By")]
    paid_by: String,
    #[tabled(rename = "Approved By")]
    approved_by: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Amounts are hidden from anonymous users.
fn amount_text(amount: f64, authenticated: bool) -> String {
    if authenticated {
        format_inr(amount)
    } else {
        MASKED_AMOUNT.to_string()
    }
}

fn matches(e: &Expense, search: &str) -> bool {
    matches_query(
        search,
        [
            e.description.as_deref(),
            e.paid_by.as_deref(),
            e.approved_by.as_deref(),
            e.expense_type.as_deref(),
        ],
    )
}

/// Merge flags over an existing expense (or an empty one for `add`).
fn draft(fields: ExpenseFields, current: Option<&Expense>) -> std::result::Result<ExpenseDraft, FieldErrors> {
    let date_of_expense = match fields.date {
        Some(raw) => match parse_date(&raw) {
            Some(date) => Some(date),
            None => {
                let mut errors = FieldErrors::new();
                errors.insert(Field::DateOfExpense, "Enter a valid date of expense");
                return Err(errors);
            }
        },
        None => current
            .and_then(|e| e.date_of_expense.as_deref())
            .and_then(parse_date),
    };

    Ok(ExpenseDraft {
        amount: fields
            .amount
            .or_else(|| current.map(|e| trim_number(e.amount)))
            .unwrap_or_default(),
        description: fields
            .description
            .or_else(|| current.and_then(|e| e.description.clone()))
            .unwrap_or_default(),
        expense_type: fields
            .expense_type
            .or_else(|| current.and_then(|e| e.expense_type.clone())),
        paid_by: fields
            .paid_by
            .or_else(|| current.and_then(|e| e.paid_by.clone())),
        approved_by: fields
            .approved_by
            .or_else(|| current.and_then(|e| e.approved_by.clone())),
        payment_mode: fields
            .mode
            .or_else(|| current.and_then(|e| e.payment_mode.clone())),
        date_of_expense,
    })
}

/// Attach the configured event and financial year.
fn payload(valid: ValidExpense, config: &Config) -> ExpensePayload {
    ExpensePayload {
        amount: valid.amount,
        description: valid.description,
        event_id: config.event_id,
        financial_year_id: config.financial_year_id,
        expense_type: valid.expense_type,
        paid_by: valid.paid_by,
        approved_by: valid.approved_by,
        payment_mode: valid.payment_mode,
        date_of_expense: valid.date_of_expense.map(|d| d.format("%Y-%m-%d").to_string()),
    }
}

fn validated(fields: ExpenseFields, current: Option<&Expense>, config: &Config) -> Result<ExpensePayload> {
    let draft = draft(fields, current).map_err(ConsoleError::Validation)?;
    let valid = validate_expense(&draft).map_err(ConsoleError::Validation)?;
    Ok(payload(valid, config))
}

/// Execute an expense command
pub async fn execute(command: ExpenseCommands, ctx: &Context) -> Result<()> {
    let authenticated = ctx.is_authenticated();
    match command {
        ExpenseCommands::List { search, page } => {
            let expenses = ctx.api.list_expenses().await?;
            let filtered: Vec<Expense> = expenses.into_iter().filter(|e| matches(e, &search)).collect();
            let page = paginate(&filtered, page, ctx.config.rows_per_page).map_numbered(|serial, e| {
                ExpenseRow {
                    serial,
                    id: e.id,
                    amount: amount_text(e.amount, authenticated),
                    date: dash(e.date_of_expense),
                    description: dash(e.description),
                    expense_type: dash(e.expense_type),
                    paid_by: dash(e.paid_by),
                    approved_by: dash(e.approved_by),
                    mode: dash(e.payment_mode),
                }
            });
            output::print_page(page, ctx.format)
        }

        ExpenseCommands::Show { id } => {
            let expense = ctx.api.get_expense(id).await?;
            if ctx.format == OutputFormat::Json {
                return output::print_json(&expense);
            }
            let mode = paint(&payment_mode_badge(expense.payment_mode.as_deref()));
            print_fields([
                ("ID", expense.id.to_string()),
                ("Amount", amount_text(expense.amount, authenticated)),
                ("Description", dash(expense.description)),
                ("Type", dash(expense.expense_type)),
                ("Paid By", dash(expense.paid_by)),
                ("Approved By", dash(expense.approved_by)),
                ("Payment Mode", mode),
                ("Date", dash(expense.date_of_expense)),
            ]);
            Ok(())
        }

        ExpenseCommands::Add(fields) => {
            let body = validated(fields, None, &ctx.config)?;
            let created = ctx.api.create_expense(&body).await?;
            print_success(&format!("Expense {} added", created.id));
            Ok(())
        }

        ExpenseCommands::Update { id, fields } => {
            let current = ctx.api.get_expense(id).await?;
            let body = validated(fields, Some(&current), &ctx.config)?;
            ctx.api.update_expense(id, &body).await?;
            print_success(&format!("Expense {id} updated"));
            Ok(())
        }

        ExpenseCommands::Delete { id, yes } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete expense {id}? This cannot be undone."))
                    .default(false)
                    .interact()?;
                if !confirm {
                    print_error("Aborted");
                    return Ok(());
                }
            }
            ctx.api.delete_expense(id).await?;
            print_success(&format!("Deleted expense {id}"));
            Ok(())
        }
    }
}
