//! Client-side table helpers: search, pagination, badges and money
//! formatting shared by every list view.

use serde::Serialize;

// ─────────────────────────────────────────────────────────
// Search & pagination
// ─────────────────────────────────────────────────────────

/// Case-insensitive substring match over any of `fields`. An empty query
/// matches everything.
pub fn matches_query<'a, I>(query: &str, fields: I) -> bool
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// 1-based, already clamped into range.
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    /// Serial number of the first row on this page.
    pub first_serial: usize,
}

impl<T> Page<T> {
    /// `"Page 2 of 5"`; an empty list reads `"Page 1 of 1"`.
    pub fn footer(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages.max(1))
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Turn each row into a display row, passing its serial number along.
    pub fn map_numbered<U>(self, mut f: impl FnMut(usize, T) -> U) -> Page<U> {
        let first = self.first_serial;
        Page {
            rows: self
                .rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| f(first + i, row))
                .collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_rows: self.total_rows,
            first_serial: first,
        }
    }
}

/// Slice `items` into page `page` (1-based) of `rows_per_page` rows.
pub fn paginate<T: Clone>(items: &[T], page: usize, rows_per_page: usize) -> Page<T> {
    let rows_per_page = rows_per_page.max(1);
    let total_rows = items.len();
    let total_pages = total_rows.div_ceil(rows_per_page);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * rows_per_page;
    let end = (start + rows_per_page).min(total_rows);
    let rows = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        rows,
        page,
        total_pages,
        total_rows,
        first_serial: start + 1,
    }
}

// ─────────────────────────────────────────────────────────
// Badges
// ─────────────────────────────────────────────────────────

/// Color family of a badge; rendering lives in [`crate::output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Info,
    Bad,
    Warn,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub tone: Tone,
}

impl Badge {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Payments view: zero difference means the pledge is met.
pub fn percent_diff_badge(percent_diff: f64) -> Badge {
    if percent_diff == 0.0 {
        Badge::new("✔ Fully Paid", Tone::Info)
    } else if percent_diff > 0.0 {
        Badge::new(format!("{} %", trim_number(percent_diff)), Tone::Good)
    } else {
        Badge::new(format!("{} %", trim_number(percent_diff)), Tone::Bad)
    }
}

/// Expenses view: one color per known payment mode.
pub fn payment_mode_badge(mode: Option<&str>) -> Badge {
    let text = mode.unwrap_or("-").to_string();
    let tone = match mode.map(str::to_lowercase).as_deref() {
        Some("cash") => Tone::Good,
        Some("upi") => Tone::Info,
        Some("bank transfer") => Tone::Warn,
        Some("cheque") => Tone::Bad,
        _ => Tone::Muted,
    };
    Badge::new(text, tone)
}

// ─────────────────────────────────────────────────────────
// Money
// ─────────────────────────────────────────────────────────

/// `₹ 1234.50`, fixed two decimals.
pub fn format_rupees(amount: f64) -> String {
    format!("₹ {amount:.2}")
}

/// `₹ 1,23,456.5`: Indian digit grouping, at most two fraction digits.
pub fn format_inr(amount: f64) -> String {
    format!("₹ {}", group_indian(amount))
}

/// Masked amount shown to anonymous users.
pub const MASKED_AMOUNT: &str = "₹ *****";

fn group_indian(amount: f64) -> String {
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let frac = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    if digits.len() <= 3 {
        grouped.extend(&digits);
    } else {
        let (head, last3) = digits.split_at(digits.len() - 3);
        let lead = head.len() % 2;
        for (i, ch) in head.iter().enumerate() {
            if i > 0 && (i + 2 - lead) % 2 == 0 {
                grouped.push(',');
            }
            grouped.push(*ch);
        }
        grouped.push(',');
        grouped.extend(last3);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `12.0 -> "12"`, `-12.5 -> "-12.5"`.
pub fn trim_number(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}
