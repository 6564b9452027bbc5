use std::io::Write;

use assist_service::stdio_service;

const USAGE: &str = "assist-service: reads one JSON request from stdin and prints one JSON envelope.

usage: assist-service [--check | --version | --help] < request.json

  --check     query the Stack Exchange API and print connectivity + quota
  --version   print the version
  --help      print this message";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the envelope; logs go to stderr.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("assist-service {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let code = if args.iter().any(|a| a == "--check") {
        stdio_service::run_check().await?
    } else {
        stdio_service::run().await
    };

    std::io::stdout().flush()?;
    std::process::exit(code);
}
