//! Map validated CLI arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{gate, logging};
use anyhow::Result;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8000);

    let gate_opts = gate::Options::parse(matches)?;

    let log_file = matches
        .get_one::<String>(logging::ARG_LOG_FILE)
        .map(PathBuf::from);

    Ok(Action::Server(Args {
        port,
        secret_file: gate_opts.secret_file,
        totp_window: gate_opts.totp_window,
        token_lifetime: gate_opts.token_lifetime,
        location: gate_opts.location,
        cookie_name: gate_opts.cookie_name,
        secure_cookie: gate_opts.secure_cookie,
        title: gate_opts.title,
        style: gate_opts.style,
        sweep_interval: gate_opts.sweep_interval,
        log_file,
    }))
}
