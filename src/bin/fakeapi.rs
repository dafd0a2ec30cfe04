//! Fake update API binary.
//!
//! Serves the fake API standalone, for runs where the client under test is
//! started by hand or by another harness.

use clap::Parser;
use fakeapi::cli::{Cli, Command};
use fakeapi::{MockServer, ObservedCall, PrettyPrint, RunReport, Scenario, ServerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded.
async fn run(cli: Cli) -> fakeapi::Result<bool> {
    match cli.command {
        Command::Serve {
            scenario,
            output,
            host,
        } => handle_serve(scenario, output, host, cli.json).await,
        Command::Check { scenario } => handle_check(scenario, cli.json),
    }
}

async fn handle_serve(
    scenario: Option<PathBuf>,
    output: Option<PathBuf>,
    host: Option<String>,
    json: bool,
) -> fakeapi::Result<bool> {
    let scenario = match scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };

    let mut config = ServerConfig::from_env();
    if let Some(host) = host {
        config = config.with_host(host);
    }

    let mut server = MockServer::with_config(config, scenario.output.clone()).await?;
    println!("{}", server.url());
    eprintln!("Press Ctrl-C once the update job has finished");

    tokio::signal::ctrl_c().await?;

    server.stop().await;
    server.complete().await;
    let report = server.report().await;

    output_report(&report, json)?;

    if let Some(path) = output {
        Scenario::from_run(scenario.input, &report.observed, report.commit.as_deref())
            .save(&path)?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(report.passed())
}

fn handle_check(path: PathBuf, json: bool) -> fakeapi::Result<bool> {
    let scenario = Scenario::load(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&scenario.output)?);
    } else {
        let rows: Vec<ExpectationRow> = scenario
            .kinds()
            .into_iter()
            .enumerate()
            .map(|(i, kind)| ExpectationRow {
                index: i + 1,
                kind: kind.to_string(),
            })
            .collect();
        println!("{}", Table::new(rows));
        println!("\n{} expectations", scenario.output.len());
    }
    Ok(true)
}

fn output_report(report: &RunReport, json: bool) -> fakeapi::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        let rows: Vec<CallRow> = report
            .observed
            .iter()
            .enumerate()
            .map(CallRow::from)
            .collect();
        println!("{}", Table::new(rows));
        println!("\n{}", report.pretty_print());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct CallRow {
    #[tabled(rename = "#")]
    index: usize,
    kind: String,
    decoded: bool,
}

impl From<(usize, &ObservedCall)> for CallRow {
    fn from((i, call): (usize, &ObservedCall)) -> Self {
        Self {
            index: i + 1,
            kind: call.kind.clone(),
            decoded: call.is_decoded(),
        }
    }
}

#[derive(Tabled)]
struct ExpectationRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "type")]
    kind: String,
}
