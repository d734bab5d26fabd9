//! Output formatting utilities

use colored::*;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::errors::{ConsoleError, Result};
use crate::table::{Badge, Page, Tone};
use crate::workflow::Notice;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a list of rows in the requested format
pub fn print_output<T: Serialize + Tabled>(rows: Vec<T>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", render_table(rows));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}

/// Print one page of rows followed by its footer
pub fn print_page<T: Serialize + Tabled>(page: Page<T>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let footer = page_footer(&page);
            print_output(page.rows, format)?;
            println!("{}", footer.dimmed());
            Ok(())
        }
        OutputFormat::Json => print_json(&page),
    }
}

/// `Page 2 of 5 (93 rows)`, plus where the neighbouring pages are.
pub fn page_footer<T>(page: &Page<T>) -> String {
    let mut footer = format!("{} ({} rows)", page.footer(), page.total_rows);
    if page.has_prev() {
        footer.push_str(&format!("  prev: --page {}", page.page - 1));
    }
    if page.has_next() {
        footer.push_str(&format!("  next: --page {}", page.page + 1));
    }
    footer
}

/// Print a single value as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print `label  value` pairs aligned on the label column
pub fn print_fields<'a, I>(fields: I)
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let fields: Vec<(&str, String)> = fields.into_iter().collect();
    let width = fields.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (label, value) in fields {
        println!("{}  {}", format!("{label:<width$}").bold(), value);
    }
}

pub fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Color a badge by its tone
pub fn paint(badge: &Badge) -> String {
    let text = badge.text.as_str();
    match badge.tone {
        Tone::Good => text.green().to_string(),
        Tone::Info => text.blue().to_string(),
        Tone::Bad => text.red().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Muted => text.dimmed().to_string(),
    }
}

pub fn print_notice(notice: &Notice) {
    match notice {
        Notice::Success(msg) => print_success(msg),
        Notice::Warning(msg) => print_warning(msg),
        Notice::Error(msg) => print_error(msg),
    }
}

pub const HINT_LOGIN: &str = "Run `chanda login` and try again";
pub const HINT_FIX_AND_RESEND: &str = "Nothing was saved; correct the entry and submit again";
pub const HINT_RETRY_LATER: &str = "Nothing was saved; try again once the server is reachable";

/// What the user can do about a failure, when there is something to do.
pub fn error_hint(err: &ConsoleError) -> Option<&'static str> {
    if matches!(err.status(), Some(401 | 403)) {
        return Some(HINT_LOGIN);
    }
    match err {
        ConsoleError::Submission(e) if e.is_user_fixable() => Some(HINT_FIX_AND_RESEND),
        ConsoleError::Submission(_) => Some(HINT_RETRY_LATER),
        _ => None,
    }
}

/// Report a failed command on the terminal.
pub fn report_error(err: &ConsoleError) {
    match err {
        ConsoleError::Precondition(msg) => print_warning(msg),
        ConsoleError::Validation(errors) => {
            for (field, message) in errors.iter() {
                print_error(&format!("{field}: {message}"));
            }
        }
        other => print_error(&other.to_string()),
    }
    if let Some(hint) = error_hint(err) {
        print_info(hint);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
