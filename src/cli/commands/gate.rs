use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{path::PathBuf, time::Duration};

use crate::gate::config::{DEFAULT_LOCATION, DEFAULT_TITLE};

pub const ARG_SECRET_FILE: &str = "secret-file";
pub const ARG_TOTP_WINDOW: &str = "totp-window";
pub const ARG_TOKEN_LIFETIME: &str = "token-lifetime";
pub const ARG_LOCATION: &str = "location";
pub const ARG_COOKIE_NAME: &str = "cookie-name";
pub const ARG_SECURE_COOKIE: &str = "secure-cookie";
pub const ARG_TITLE: &str = "title";
pub const ARG_STYLE: &str = "style";
pub const ARG_SWEEP_INTERVAL: &str = "sweep-interval";

#[derive(Debug)]
pub struct Options {
    pub secret_file: PathBuf,
    pub totp_window: u8,
    pub token_lifetime: Duration,
    pub location: String,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub title: String,
    pub style: String,
    pub sweep_interval: Duration,
}

impl Options {
    /// Read gateway options from validated CLI matches.
    ///
    /// # Errors
    /// Returns an error if a required option is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret_file = matches
            .get_one::<PathBuf>(ARG_SECRET_FILE)
            .cloned()
            .context("missing required argument: --secret-file")?;

        let totp_window = matches
            .get_one::<u8>(ARG_TOTP_WINDOW)
            .copied()
            .unwrap_or(1);

        let token_lifetime = matches
            .get_one::<u64>(ARG_TOKEN_LIFETIME)
            .copied()
            .map(Duration::from_secs)
            .context("missing required argument: --token-lifetime")?;

        let location = matches
            .get_one::<String>(ARG_LOCATION)
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let cookie_name = matches
            .get_one::<String>(ARG_COOKIE_NAME)
            .cloned()
            .context("missing required argument: --cookie-name")?;

        let secure_cookie = matches
            .get_one::<bool>(ARG_SECURE_COOKIE)
            .copied()
            .unwrap_or(true);

        let title = matches
            .get_one::<String>(ARG_TITLE)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let style = matches
            .get_one::<String>(ARG_STYLE)
            .cloned()
            .unwrap_or_default();

        let sweep_interval = matches
            .get_one::<u64>(ARG_SWEEP_INTERVAL)
            .copied()
            .map_or(Duration::ZERO, Duration::from_secs);

        Ok(Self {
            secret_file,
            totp_window,
            token_lifetime,
            location,
            cookie_name,
            secure_cookie,
            title,
            style,
            sweep_interval,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_secret_args(command);
    with_page_args(command)
}

fn with_secret_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SECRET_FILE)
                .long(ARG_SECRET_FILE)
                .help("File holding the base32 encoded TOTP secret")
                .env("TOTPGATE_SECRET_FILE")
                .default_value("/etc/totp_secret")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_TOTP_WINDOW)
                .long(ARG_TOTP_WINDOW)
                .help("Number of 30 second steps accepted either side of now")
                .env("TOTPGATE_TOTP_WINDOW")
                .default_value("1")
                .value_parser(clap::value_parser!(u8).range(0..=10)),
        )
        .arg(
            Arg::new(ARG_TOKEN_LIFETIME)
                .long(ARG_TOKEN_LIFETIME)
                .help("Session lifetime in seconds")
                .env("TOTPGATE_TOKEN_LIFETIME")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SWEEP_INTERVAL)
                .long(ARG_SWEEP_INTERVAL)
                .help("Seconds between sweeps of expired sessions, 0 disables sweeping")
                .env("TOTPGATE_SWEEP_INTERVAL")
                .default_value("0")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn with_page_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOCATION)
                .long(ARG_LOCATION)
                .help("Path prefix the check, login and logout endpoints are mounted under")
                .env("TOTPGATE_LOCATION")
                .default_value(DEFAULT_LOCATION),
        )
        .arg(
            Arg::new(ARG_COOKIE_NAME)
                .long(ARG_COOKIE_NAME)
                .help("Name of the session cookie")
                .env("TOTPGATE_COOKIE_NAME")
                .default_value("totp_token"),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIE)
                .long(ARG_SECURE_COOKIE)
                .help("Mark the session cookie Secure")
                .env("TOTPGATE_SECURE_COOKIE")
                .default_value("true")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new(ARG_TITLE)
                .long(ARG_TITLE)
                .help("Heading and title of the login page")
                .env("TOTPGATE_TITLE")
                .default_value(DEFAULT_TITLE),
        )
        .arg(
            Arg::new(ARG_STYLE)
                .long(ARG_STYLE)
                .help("CSS inserted verbatim into the login page")
                .env("TOTPGATE_STYLE")
                .default_value(""),
        )
}
