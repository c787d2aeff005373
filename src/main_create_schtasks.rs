use clap::Parser;
use std::process::ExitCode;
use winservice_manager::cli::{self, CreateArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::run_create_schtasks(CreateArgs::parse()).await
}
