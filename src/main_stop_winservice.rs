use clap::Parser;
use std::process::ExitCode;
use winservice_manager::cli::{self, SwitchArgs};
use winservice_manager::TaskAction;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::run_switch(TaskAction::Stop, SwitchArgs::parse()).await
}
