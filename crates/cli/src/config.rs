// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use capacity_portal_api::RefreshPolicy;
use capacity_portal_domain::{DomainError, FiscalCalendar};
use capacity_portal_persistence::{PersistenceError, SheetsClient};
use std::time::Duration;
use time::{Date, macros::format_description};

/// Global options shared by every command.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    /// URL of the capacity store endpoint
    #[arg(long, env = "CAPACITY_PORTAL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "CAPACITY_PORTAL_TIMEOUT_SECS",
        default_value_t = 30,
        global = true
    )]
    pub timeout_secs: u64,

    /// Fiscal year identifier
    #[arg(long, env = "CAPACITY_PORTAL_FISCAL_YEAR", default_value_t = 2026, global = true)]
    pub fiscal_year: u16,

    /// First day of week 1 (YYYY-MM-DD)
    #[arg(
        long,
        env = "CAPACITY_PORTAL_FISCAL_START",
        default_value = "2026-02-02",
        global = true
    )]
    pub fiscal_start: String,

    /// IANA timezone used to decide the current date
    #[arg(long, env = "CAPACITY_PORTAL_TIMEZONE", default_value = "UTC", global = true)]
    pub timezone: String,

    /// Seconds a fetched vendor/user directory stays fresh
    #[arg(
        long,
        env = "CAPACITY_PORTAL_DIRECTORY_MAX_AGE_SECS",
        default_value_t = 300,
        global = true
    )]
    pub directory_max_age_secs: u64,

    /// Login email
    #[arg(long, env = "CAPACITY_PORTAL_EMAIL", global = true)]
    pub email: Option<String>,

    /// Login password
    #[arg(long, env = "CAPACITY_PORTAL_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
}

/// Configuration errors raised before any command runs.
#[derive(Debug)]
pub enum ConfigError {
    /// A command needs the store but no URL was given.
    MissingApiUrl,
    /// A command needs credentials but one was not given.
    MissingCredential(&'static str),
    /// A date option could not be parsed.
    InvalidDate { option: &'static str, value: String },
    /// The fiscal calendar options are inconsistent.
    Calendar(DomainError),
    /// The endpoint URL was refused.
    Endpoint(PersistenceError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiUrl => write!(
                f,
                "No store endpoint configured. Pass --api-url or set CAPACITY_PORTAL_API_URL"
            ),
            Self::MissingCredential(option) => write!(f, "--{option} is required for this command"),
            Self::InvalidDate { option, value } => {
                write!(f, "--{option} '{value}' is not a date in YYYY-MM-DD form")
            }
            Self::Calendar(err) => write!(f, "Invalid fiscal calendar: {err}"),
            Self::Endpoint(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parses a `YYYY-MM-DD` option value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidDate` naming the option if the value does
/// not parse.
pub fn parse_date(option: &'static str, value: &str) -> Result<Date, ConfigError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ConfigError::InvalidDate {
            option,
            value: value.to_string(),
        }
    })
}

/// Validated runtime configuration.
#[derive(Debug)]
pub struct PortalConfig {
    store: Option<SheetsClient>,
    calendar: FiscalCalendar,
    refresh: RefreshPolicy,
    email: Option<String>,
    password: Option<String>,
}

impl PortalConfig {
    /// Builds and validates configuration from the global options.
    ///
    /// The store client is only built when a URL is given, so commands
    /// that never reach the store work offline.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The fiscal start date does not parse
    /// - The year or timezone is rejected by the calendar
    /// - The endpoint URL is malformed or not HTTP(S)
    pub fn from_args(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let start: Date = parse_date("fiscal-start", &args.fiscal_start)?;
        let calendar: FiscalCalendar = FiscalCalendar::new(args.fiscal_year, start, &args.timezone)
            .map_err(ConfigError::Calendar)?;

        let store: Option<SheetsClient> = args
            .api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                SheetsClient::new(
                    url,
                    Duration::from_secs(args.timeout_secs),
                    args.fiscal_year,
                )
            })
            .transpose()
            .map_err(ConfigError::Endpoint)?;

        Ok(Self {
            store,
            calendar,
            refresh: RefreshPolicy::from_secs(args.directory_max_age_secs),
            email: args.email.clone(),
            password: args.password.clone(),
        })
    }

    /// Returns the store client.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiUrl` if no endpoint was configured.
    pub fn store(&self) -> Result<&SheetsClient, ConfigError> {
        self.store.as_ref().ok_or(ConfigError::MissingApiUrl)
    }

    #[must_use]
    pub const fn calendar(&self) -> &FiscalCalendar {
        &self.calendar
    }

    #[must_use]
    pub const fn refresh(&self) -> RefreshPolicy {
        self.refresh
    }

    /// Returns the login email and password.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredential` naming the first missing option.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let email: &str = self
            .email
            .as_deref()
            .ok_or(ConfigError::MissingCredential("email"))?;
        let password: &str = self
            .password
            .as_deref()
            .ok_or(ConfigError::MissingCredential("password"))?;
        Ok((email, password))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn args() -> GlobalArgs {
        GlobalArgs {
            api_url: None,
            timeout_secs: 30,
            fiscal_year: 2026,
            fiscal_start: String::from("2026-02-02"),
            timezone: String::from("UTC"),
            directory_max_age_secs: 300,
            email: None,
            password: None,
        }
    }

    #[test]
    fn test_defaults_build_the_standard_calendar() {
        let config: PortalConfig = PortalConfig::from_args(&args()).unwrap();
        assert_eq!(config.calendar(), &FiscalCalendar::fiscal_2026());
        assert_eq!(config.refresh().max_age(), Duration::from_secs(300));
        assert!(matches!(config.store(), Err(ConfigError::MissingApiUrl)));
    }

    #[test]
    fn test_bad_start_date_is_named() {
        let err: ConfigError = PortalConfig::from_args(&GlobalArgs {
            fiscal_start: String::from("02/02/2026"),
            ..args()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "--fiscal-start '02/02/2026' is not a date in YYYY-MM-DD form"
        );
    }

    #[test]
    fn test_unknown_timezone_is_refused() {
        let err: ConfigError = PortalConfig::from_args(&GlobalArgs {
            timezone: String::from("Mars/Olympus"),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Calendar(_)));
    }

    #[test]
    fn test_non_http_endpoint_is_refused() {
        let err: ConfigError = PortalConfig::from_args(&GlobalArgs {
            api_url: Some(String::from("ftp://sheets.example.com/exec")),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Endpoint(_)));

        let config: PortalConfig = PortalConfig::from_args(&GlobalArgs {
            api_url: Some(String::from("https://sheets.example.com/exec")),
            ..args()
        })
        .unwrap();
        assert!(config.store().is_ok());
    }

    #[test]
    fn test_credentials_report_missing_option() {
        let err: ConfigError = PortalConfig::from_args(&GlobalArgs {
            email: Some(String::from("v-01@vendor.com")),
            ..args()
        })
        .unwrap()
        .credentials()
        .unwrap_err();
        assert_eq!(err.to_string(), "--password is required for this command");
    }
}
