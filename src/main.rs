use clap::Parser;
use expense_insights::args::{Args, Command};
use expense_insights::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for running the program without hitting the Google APIs. When
    // EXPENSES_IN_TEST_MODE is set and non-empty, the mode will be Mode::Test, otherwise it will
    // be Mode::Google.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.client_secret(), init_args.sheet_url())
                .await?
                .print()
        }

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            if auth_args.verify() {
                commands::auth_verify(&config).await?.print()
            } else {
                commands::auth(&config).await?.print()
            }
        }

        Command::Years => commands::years(&Config::load(home).await?, mode)
            .await?
            .print(),

        Command::Expenses(expenses_args) => {
            let config = Config::load(home).await?;
            commands::expenses(
                &config,
                mode,
                &expenses_args.year(),
                expenses_args.month_index(),
            )
            .await?
            .print()
        }

        Command::Monthly(year_args) => {
            let config = Config::load(home).await?;
            commands::monthly(&config, mode, &year_args.year())
                .await?
                .print()
        }

        Command::Daily(daily_args) => {
            let config = Config::load(home).await?;
            match daily_args.date() {
                Some(date) => commands::daily_records(&config, mode, date)
                    .await?
                    .print(),
                None => commands::daily(&config, mode, &daily_args.year())
                    .await?
                    .print(),
            }
        }

        Command::Categories(categories_args) => {
            let config = Config::load(home).await?;
            commands::categories(
                &config,
                mode,
                &categories_args.year(),
                categories_args.month_index(),
            )
            .await?
            .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "expense_insights",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
