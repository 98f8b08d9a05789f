use crate::error::Res;
use crate::model::{is_iso_date, Amount, Category};
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// One normalized expense line item, exactly as it reaches the aggregators.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseRecord {
    /// `YYYY-MM-DD` when the sheet cell was recognizable as a date, otherwise the trimmed cell.
    pub date: String,
    pub name: String,
    pub category: String,
    /// Free-text classification, usually the payment method.
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Amount,
    pub description: String,
}

impl ExpenseRecord {
    pub fn new(
        date: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        kind: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            name: name.into(),
            category: category.into(),
            kind: kind.into(),
            amount,
            description: description.into(),
        }
    }
}

/// Represents the known columns of a yearly expense tab, in the order they must appear.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseColumn {
    Date,
    Name,
    Category,
    Type,
    Amount,
    Description,
}

serde_plain::derive_display_from_serialize!(ExpenseColumn);
serde_plain::derive_fromstr_from_deserialize!(ExpenseColumn);

impl ExpenseColumn {
    pub const ALL: [ExpenseColumn; EXPENSE_COL_COUNT] = [
        ExpenseColumn::Date,
        ExpenseColumn::Name,
        ExpenseColumn::Category,
        ExpenseColumn::Type,
        ExpenseColumn::Amount,
        ExpenseColumn::Description,
    ];

    pub fn as_header_str(&self) -> &'static str {
        match self {
            ExpenseColumn::Date => DATE_STR,
            ExpenseColumn::Name => NAME_STR,
            ExpenseColumn::Category => CATEGORY_STR,
            ExpenseColumn::Type => TYPE_STR,
            ExpenseColumn::Amount => AMOUNT_STR,
            ExpenseColumn::Description => DESCRIPTION_STR,
        }
    }

    /// Index of this column within a row.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

pub(crate) const DATE_STR: &str = "Date";
pub(crate) const NAME_STR: &str = "Name";
pub(crate) const CATEGORY_STR: &str = "Category";
pub(crate) const TYPE_STR: &str = "Type";
pub(crate) const AMOUNT_STR: &str = "Amount";
pub(crate) const DESCRIPTION_STR: &str = "Description";

pub(crate) const EXPENSE_COL_COUNT: usize = 6;

/// Rows with a larger amount are skipped. Any realistic number of rows under this bound sums well
/// within `Decimal`'s range.
pub const MAX_EXPENSE_AMOUNT: i64 = 1_000_000_000_000;

/// Parses the rows of a yearly expense tab, header row first, into the records that are valid for
/// aggregation.
///
/// The header row must start with `Date, Name, Category, Type, Amount, Description`. Data rows that
/// are blank, carry an unknown category, or have an amount that is unparsable, not positive or
/// above `MAX_EXPENSE_AMOUNT` are skipped.
pub fn parse_expense_rows<S, R>(sheet_data: impl IntoIterator<Item = R>) -> Res<Vec<ExpenseRecord>>
where
    S: AsRef<str>,
    R: IntoIterator<Item = S>,
{
    let mut rows = sheet_data.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };
    validate_header(&header)?;

    let mut records = Vec::new();
    for (row_ix, row) in rows.enumerate() {
        let cells: Vec<String> = row
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        // Sheet row numbers are 1-based and the header occupies row 1.
        match parse_expense_row(&cells) {
            Some(record) => records.push(record),
            None => debug!("Skipping row {}: {cells:?}", row_ix + 2),
        }
    }
    Ok(records)
}

fn validate_header(header: &[String]) -> Res<()> {
    let matches = ExpenseColumn::ALL
        .iter()
        .all(|col| header.get(col.index()).map(String::as_str) == Some(col.as_header_str()));
    if !matches {
        let expected: Vec<&str> = ExpenseColumn::ALL
            .iter()
            .map(|col| col.as_header_str())
            .collect();
        bail!("Unexpected header row. Expected: {}.", expected.join(", "));
    }
    Ok(())
}

/// Converts trimmed cells into a record, or `None` if the row should not be used.
fn parse_expense_row(cells: &[String]) -> Option<ExpenseRecord> {
    if cells.iter().all(|c| c.is_empty()) {
        return None;
    }
    let cell = |col: ExpenseColumn| cells.get(col.index()).map(String::as_str).unwrap_or("");

    let category = cell(ExpenseColumn::Category);
    if !Category::is_known(category) {
        return None;
    }
    let amount = Amount::from_str(cell(ExpenseColumn::Amount)).ok()?;
    if !amount.is_positive() || amount.value() > Decimal::from(MAX_EXPENSE_AMOUNT) {
        return None;
    }

    Some(ExpenseRecord::new(
        normalize_date(cell(ExpenseColumn::Date)),
        cell(ExpenseColumn::Name),
        category,
        cell(ExpenseColumn::Type),
        amount,
        cell(ExpenseColumn::Description),
    ))
}

/// Normalizes a date cell to `YYYY-MM-DD` where possible.
///
/// A time suffix after the first comma is dropped. `M/D/YYYY` is zero-padded into ISO form.
/// Anything else is returned as-is (trimmed) and will not match any period.
pub(crate) fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    let without_time = raw.split(',').next().unwrap_or(raw).trim();
    if is_iso_date(without_time) {
        return without_time.to_string();
    }
    let parts: Vec<&str> = without_time.split('/').collect();
    if let [month, day, year] = parts[..] {
        let is_num = |s: &str, min: usize, max: usize| {
            (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
        };
        if is_num(month, 1, 2) && is_num(day, 1, 2) && is_num(year, 4, 4) {
            return format!("{year}-{month:0>2}-{day:0>2}");
        }
    }
    without_time.to_string()
}
