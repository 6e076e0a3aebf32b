use std::io::{self, Read, Write};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

// protoc talks to plugins over stdin/stdout, so logs go to stderr.
fn main() {
    if let Err(error) = run() {
        eprintln!("protoc-gen-dox error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    init_tracing()?;

    let mut input = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut input)
        .context("failed to read code generator request from stdin")?;
    tracing::debug!(bytes = input.len(), "read code generator request");

    let output = dox_generator::run(&input)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&output)
        .context("failed to write code generator response to stdout")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("PROTOC_GEN_DOX_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
