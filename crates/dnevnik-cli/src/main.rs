//! dnevnik - command-line client for the dnevnik school portal.
//!
//! Logs in once, keeps the token pair in the configured credential store and
//! prints students, periods, grades, homework and announcements.

mod config;

use std::io;

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dnevnik_core::models::GradesTable;
use dnevnik_core::utils::{format_date, truncate_string};
use dnevnik_core::{
    CredentialStore, Dnevnik, DnevnikOptions, EstimateQuery, FileCredentialStore, HomeworkDate,
    KeyringCredentialStore,
};

use config::{Config, StoreBackend};

/// Environment variable consulted before prompting for a password
const PASSWORD_ENV: &str = "DNEVNIK_PASSWORD";

/// Maximum width of an announcement description in listings
const DESCRIPTION_WIDTH: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "dnevnik", version, about = "School portal client")]
struct Cli {
    /// Portal login; defaults to the last one used
    #[arg(long, global = true)]
    login: Option<String>,

    /// Revoke the session when the command finishes
    #[arg(long, global = true)]
    auto_logout: bool,

    /// Where to keep credentials between runs
    #[arg(long, value_enum, global = true)]
    store: Option<StoreBackend>,

    /// Print raw JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with a password and remember the credentials
    Login,
    /// List students available to this account
    Students,
    /// List grading periods for the current school year
    Periods,
    /// Show grades for a period
    Estimate {
        #[arg(long)]
        period: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        /// Only print this table of the response
        #[arg(long, value_parser = ["period", "week"])]
        table: Option<String>,
    },
    /// Show homework for a day
    Homework {
        /// Day as YYYY-MM-DD
        #[arg(long, conflicts_with = "days")]
        date: Option<NaiveDate>,
        /// Days from today, e.g. 1 for tomorrow
        #[arg(long, allow_hyphen_values = true)]
        days: Option<i64>,
    },
    /// List announcements
    Announcements,
    /// Revoke the current session
    Logout {
        /// Also delete the stored credentials
        #[arg(long)]
        forget: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    let login = cli.login.clone().or_else(|| config.last_login.clone());
    let backend = cli.store.unwrap_or(config.store);

    let mut options = match cli.command {
        Command::Login => {
            let login = login
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--login is required to log in"))?;
            let password = read_password()?;
            DnevnikOptions::with_password(login, password)
        }
        _ => DnevnikOptions {
            login: login.clone(),
            ..Default::default()
        },
    };
    options.auto_logout = cli.auto_logout || config.auto_logout;

    let forget = matches!(cli.command, Command::Logout { forget: true });
    match backend {
        StoreBackend::File => {
            let path = FileCredentialStore::default_path(login.as_deref())?;
            let store = FileCredentialStore::open(&path)
                .with_context(|| format!("Failed to open credential file {}", path.display()))?;
            run(&cli, options, store).await?;
            if forget {
                FileCredentialStore::open(&path)?
                    .delete()
                    .context("Failed to delete credential file")?;
            }
        }
        StoreBackend::Keyring => {
            let Some(ref login) = login else {
                bail!("--login is required with the keyring store");
            };
            let store = KeyringCredentialStore::open(login)
                .context("Failed to open keychain entry")?;
            run(&cli, options, store).await?;
            if forget {
                KeyringCredentialStore::open(login)?
                    .delete()
                    .context("Failed to delete keychain entry")?;
            }
        }
    }

    if matches!(cli.command, Command::Login) {
        config.last_login = login;
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    Ok(())
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    Ok(rpassword::prompt_password("Password: ")?)
}

async fn run<S: CredentialStore>(cli: &Cli, options: DnevnikOptions, store: S) -> Result<()> {
    let mut client = Dnevnik::with_store(options, store)
        .await
        .context("Failed to connect to the portal")?;

    let result = execute(cli, &mut client).await;
    let closed = client.close().await.context("Failed to close the session");
    result?;
    closed
}

async fn execute<S: CredentialStore>(cli: &Cli, client: &mut Dnevnik<S>) -> Result<()> {
    match &cli.command {
        Command::Login => {
            let student = client.student();
            info!(student = %student.id, "Logged in");
            println!("Logged in as {} ({})", student.full_name(), student.class_name);
        }
        Command::Students => {
            if cli.json {
                return print_json(&client.students());
            }
            for student in client.students() {
                println!(
                    "{}  {}  {}, {}",
                    student.id,
                    student.full_name(),
                    student.class_name,
                    student.org_name
                );
            }
        }
        Command::Periods => {
            let periods = client.get_periods().await?;
            if cli.json {
                return print_json(&periods);
            }
            for period in periods {
                println!("{}  {}", period.id, period.name);
            }
        }
        Command::Estimate {
            period,
            year,
            month,
            subject,
            table,
        } => {
            let query = EstimateQuery {
                year: *year,
                month_id: month.clone(),
                subject_id: subject.clone(),
            };
            let estimate = client.get_estimate(period, query).await?;
            let table = match table.as_deref() {
                Some("period") => Some(GradesTable::Period),
                Some("week") => Some(GradesTable::Week),
                _ => None,
            };
            match table {
                Some(table) => match table.select(&estimate) {
                    Some(selected) => print_json(selected)?,
                    None => bail!("Response has no {}", table.key()),
                },
                None => print_json(&estimate)?,
            }
        }
        Command::Homework { date, days } => {
            let date = homework_date(*date, *days)?;
            print_json(&client.get_homework(date).await?)?;
        }
        Command::Announcements => {
            let announcements = client.get_announcements().await?;
            if cli.json {
                return print_json(&announcements);
            }
            for a in announcements {
                let marker = if a.is_important { "!" } else { " " };
                println!(
                    "{} {}  {}  {}",
                    marker,
                    format_date(&a.date),
                    a.title,
                    truncate_string(&a.description, DESCRIPTION_WIDTH)
                );
            }
        }
        Command::Logout { .. } => {
            client.revoke().await?;
            println!("Logged out");
        }
    }
    Ok(())
}

/// An explicit date wins over a day offset
fn homework_date(date: Option<NaiveDate>, days: Option<i64>) -> Result<HomeworkDate> {
    Ok(match (date, days) {
        (Some(date), _) => HomeworkDate::On(date),
        (None, Some(days)) => HomeworkDate::In(
            Duration::try_days(days)
                .ok_or_else(|| anyhow::anyhow!("--days {} is out of range", days))?,
        ),
        (None, None) => HomeworkDate::Today,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homework_date_from_flags() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(homework_date(Some(day), None).unwrap(), HomeworkDate::On(day));
        assert_eq!(homework_date(None, None).unwrap(), HomeworkDate::Today);
        assert_eq!(
            homework_date(None, Some(-1)).unwrap(),
            HomeworkDate::In(Duration::days(-1))
        );
    }

    #[test]
    fn test_logout_forget_flag() {
        let cli = Cli::try_parse_from(["dnevnik", "logout", "--forget"]).unwrap();
        assert!(matches!(cli.command, Command::Logout { forget: true }));

        let cli = Cli::try_parse_from(["dnevnik", "--login", "ivanov", "logout"]).unwrap();
        assert!(matches!(cli.command, Command::Logout { forget: false }));
        assert_eq!(cli.login.as_deref(), Some("ivanov"));
    }

    #[test]
    fn test_homework_days_out_of_range() {
        assert!(homework_date(None, Some(i64::MAX)).is_err());
        assert!(homework_date(None, Some(i64::MIN)).is_err());
    }
}
