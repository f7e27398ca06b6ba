use std::process::ExitCode;

use biocipher_host::config::Cli;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match biocipher_host::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("biocipher-host: {e}");
            ExitCode::FAILURE
        }
    }
}
