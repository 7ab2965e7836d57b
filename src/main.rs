mod cli;
mod config;
mod credentials;
mod error;
mod operations;
mod outcome;
mod request;
mod tls;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use credentials::AwsCredentialProvider;
use request::HttpTransport;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    config::init_logging(cli.debug)?;

    Ok(cli::dispatch(
        cli.command,
        &cli.server_url,
        &AwsCredentialProvider,
        || tls::build_client().map(HttpTransport::new),
    ))
}
