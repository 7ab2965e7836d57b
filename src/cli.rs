//! CLI entry point, command definitions and dispatch.

use crate::config::{DEFAULT_SERVER_URL, SERVER_URL_ENV};
use crate::credentials::CredentialProvider;
use crate::error::{DispatchError, FileReadError, TlsError};
use crate::operations::{execute, OperationRequest};
use crate::outcome::ServiceOutcome;
use crate::request::{RequestTemplate, Transport};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Batch Wrapper - cancel, terminate, and submit AWS Batch jobs.
#[derive(Parser)]
#[command(name = "batchwrapper")]
#[command(version)]
#[command(about = "Cancel, terminate, and submit AWS Batch jobs.")]
#[command(long_about = "Cancel, terminate, and submit AWS Batch jobs.\n\
                        Full docs at https://bit.ly/HutchBatchDocs")]
pub struct Cli {
    /// Base URL of the batch dashboard service
    #[arg(
        long,
        global = true,
        env = SERVER_URL_ENV,
        default_value = DEFAULT_SERVER_URL,
        value_parser = clap::value_parser!(Url)
    )]
    pub server_url: Url,

    /// Log request details to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Cancel a job you submitted
    Cancel {
        /// Job ID
        #[arg(long)]
        job_id: String,
        /// reason for termination
        #[arg(long)]
        reason: String,
    },
    /// Terminate a job you submitted
    Terminate {
        /// Job ID
        #[arg(long)]
        job_id: String,
        /// reason for termination
        #[arg(long)]
        reason: String,
    },
    /// Submit a job
    Submit {
        /// JSON file containing job info
        #[arg(long, value_name = "JSON_FILE", value_parser = existing_file)]
        cli_input_json: PathBuf,
    },
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else if path.exists() {
        Err(format!("path '{}' is not a file", value))
    } else {
        Err(format!("path '{}' does not exist", value))
    }
}

impl Commands {
    /// Turn the parsed command into the request it stands for. Reads the job file for `submit`.
    pub fn into_operation(self) -> Result<OperationRequest, FileReadError> {
        match self {
            Commands::Submit { cli_input_json } => OperationRequest::submit_from_file(&cli_input_json),
            Commands::Cancel { job_id, reason } => Ok(OperationRequest::Cancel { job_id, reason }),
            Commands::Terminate { job_id, reason } => {
                Ok(OperationRequest::Terminate { job_id, reason })
            }
        }
    }
}

/// What the process prints and the code it exits with.
///
/// `text` is raw bytes so an unexpected response body reaches stdout unaltered.
#[derive(Debug, PartialEq, Eq)]
pub struct Report {
    pub text: Vec<u8>,
    pub code: u8,
}

impl Report {
    fn from_result(result: Result<ServiceOutcome, DispatchError>) -> Self {
        match result {
            Ok(outcome) => Report {
                text: outcome.render(),
                code: if outcome.is_success() {
                    EXIT_SUCCESS
                } else {
                    EXIT_FAILURE
                },
            },
            Err(err) => {
                tracing::debug!(error = ?err, "aborted before contacting the service");
                Report {
                    text: err.to_string().into_bytes(),
                    code: EXIT_FAILURE,
                }
            }
        }
    }
}

/// Run one command from credentials to classified outcome.
///
/// Credentials are resolved first; a failure there returns before the transport is
/// even built, so no request can be sent.
fn run<T, F>(
    command: Commands,
    server_url: &Url,
    provider: &dyn CredentialProvider,
    connect: F,
) -> Result<ServiceOutcome, DispatchError>
where
    T: Transport,
    F: FnOnce() -> Result<T, TlsError>,
{
    let creds = provider.resolve()?;
    tracing::debug!(?creds, "resolved AWS credentials");

    let template = RequestTemplate::build(server_url, &creds);
    let operation = command.into_operation()?;
    let transport = connect()?;

    Ok(execute(operation, &template, &transport))
}

/// Execute `command`, print its result and pick the process exit code.
pub fn dispatch<T, F>(
    command: Commands,
    server_url: &Url,
    provider: &dyn CredentialProvider,
    connect: F,
) -> ExitCode
where
    T: Transport,
    F: FnOnce() -> Result<T, TlsError>,
{
    let report = Report::from_result(run(command, server_url, provider, connect));

    if let Err(e) = write_report(&report) {
        tracing::error!(error = %e, "failed to write output");
        return ExitCode::from(EXIT_FAILURE);
    }
    ExitCode::from(report.code)
}

fn write_report(report: &Report) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&report.text)?;
    stdout.write_all(b"\n")?;
    stdout.flush()
}
