//! Types that represent the core data model, such as `ExpenseRecord` and `Year`.
mod amount;
mod category;
mod expense;
mod period;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use expense::{parse_expense_rows, ExpenseColumn, ExpenseRecord, MAX_EXPENSE_AMOUNT};
pub use period::{
    is_iso_date, year_day_key, year_month_key, Year, YearDay, YearMonth, MONTH_LABELS,
};
