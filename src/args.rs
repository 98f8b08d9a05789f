//! These structs provide the CLI interface for the expenses CLI.

use crate::model::Year;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: Summaries of personal expenses kept in a Google sheet.
///
/// Your sheet holds one tab per year, named with the four-digit year, whose columns are Date,
/// Name, Category, Type, Amount and Description. This program reads those tabs and reports totals
/// per month, a running total per day and totals per category. Reports are printed to stdout as
/// JSON, messages go to stderr.
///
/// You will need to set up a Google OAuth client for a desktop application and run `expenses init`
/// followed by `expenses auth` before the other commands will work.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need two things ready beforehand:
    ///
    /// - The URL of your expense Google Sheet, passed as --sheet-url.
    ///
    /// - The OAuth client credentials JSON for a desktop application, downloaded from Google Cloud
    ///   Console and passed as --client-secret. Its redirect URIs must include http://localhost.
    ///
    /// The data directory defaults to $HOME/expenses; use --home or EXPENSES_HOME to put it
    /// somewhere else.
    Init(InitArgs),
    /// Authenticate with Google Sheets via OAuth.
    Auth(AuthArgs),
    /// List the years that have a tab in the sheet, newest first.
    Years,
    /// Print the expense records of a year, or of one month.
    Expenses(ExpensesArgs),
    /// Summarize a year month by month.
    Monthly(YearArgs),
    /// Print the daily spend and running total for a year, or the records of one day.
    Daily(DailyArgs),
    /// Break a year, or one month, down by category.
    Categories(CategoriesArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and credentials are held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The path to your downloaded OAuth client credentials. This file will be copied to the
    /// default secrets location in the data directory.
    #[arg(long)]
    client_secret: PathBuf,
}

impl InitArgs {
    pub fn new(sheet_url: impl Into<String>, client_secret: impl Into<PathBuf>) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn client_secret(&self) -> &Path {
        &self.client_secret
    }
}

/// (Not shown): Args for the `expenses auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh the stored token without opening a browser.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// (Not shown): Selects the year tab to read.
#[derive(Debug, Default, Parser, Clone)]
pub struct YearArgs {
    /// The four-digit year to report on. Defaults to the current year.
    #[arg(long)]
    year: Option<Year>,
}

impl YearArgs {
    pub fn new(year: Option<Year>) -> Self {
        Self { year }
    }

    /// The requested year, or the current year.
    pub fn year(&self) -> Year {
        self.year.clone().unwrap_or_else(Year::current)
    }
}

/// (Not shown): Args for the `expenses expenses` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ExpensesArgs {
    #[clap(flatten)]
    year: YearArgs,

    /// Only list records from this month, 1 to 12.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    month: Option<u8>,
}

impl ExpensesArgs {
    pub fn new(year: Option<Year>, month: Option<u8>) -> Self {
        Self {
            year: YearArgs::new(year),
            month,
        }
    }

    pub fn year(&self) -> Year {
        self.year.year()
    }

    /// The 0-based month index.
    pub fn month_index(&self) -> Option<usize> {
        month_index(self.month)
    }
}

/// (Not shown): Args for the `expenses daily` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct DailyArgs {
    #[clap(flatten)]
    year: YearArgs,

    /// Print the records of this day, YYYY-MM-DD, instead of the whole series. The year is taken
    /// from the date.
    #[arg(long, conflicts_with = "year")]
    date: Option<String>,
}

impl DailyArgs {
    pub fn new(year: Option<Year>, date: Option<String>) -> Self {
        Self {
            year: YearArgs::new(year),
            date,
        }
    }

    pub fn year(&self) -> Year {
        self.year.year()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// (Not shown): Args for the `expenses categories` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct CategoriesArgs {
    #[clap(flatten)]
    year: YearArgs,

    /// Only count records from this month, 1 to 12.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    month: Option<u8>,
}

impl CategoriesArgs {
    pub fn new(year: Option<Year>, month: Option<u8>) -> Self {
        Self {
            year: YearArgs::new(year),
            month,
        }
    }

    pub fn year(&self) -> Year {
        self.year.year()
    }

    /// The 0-based month index.
    pub fn month_index(&self) -> Option<usize> {
        month_index(self.month)
    }
}

/// Converts a 1-based CLI month into a 0-based month index.
fn month_index(month: Option<u8>) -> Option<usize> {
    month.and_then(|m| usize::from(m).checked_sub(1))
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or EXPENSES_HOME instead of relying on the default \
                directory. If you continue using the program right now, you may have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("expenses").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_monthly_with_year() {
        let args = parse(&["--home", "/tmp/x", "--log-level", "debug", "monthly", "--year", "2024"]);
        assert_eq!(args.common().home().path(), Path::new("/tmp/x"));
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Monthly(year_args) => assert_eq!(year_args.year().as_str(), "2024"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_year_defaults_to_current() {
        let args = parse(&["--home", "/tmp/x", "daily"]);
        match args.command() {
            Command::Daily(daily) => {
                assert_eq!(daily.year(), Year::current());
                assert!(daily.date().is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_month_is_one_based() {
        let args = parse(&["--home", "/tmp/x", "categories", "--month", "1"]);
        match args.command() {
            Command::Categories(c) => assert_eq!(c.month_index(), Some(0)),
            other => panic!("unexpected command {other:?}"),
        }
        let args = parse(&["--home", "/tmp/x", "expenses", "--month", "12", "--year", "2023"]);
        match args.command() {
            Command::Expenses(e) => {
                assert_eq!(e.month_index(), Some(11));
                assert_eq!(e.year().as_str(), "2023");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad = [
            vec!["expenses", "--home", "/tmp/x", "categories", "--month", "13"],
            vec!["expenses", "--home", "/tmp/x", "categories", "--month", "0"],
            vec!["expenses", "--home", "/tmp/x", "monthly", "--year", "24"],
            vec!["expenses", "--home", "/tmp/x", "daily", "--year", "2024", "--date", "2024-01-01"],
        ];
        for argv in bad {
            assert!(Args::try_parse_from(argv).is_err());
        }
    }
}
