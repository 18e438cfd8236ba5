use std::process::ExitCode;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal front end for the voting contract")]
struct Args {
    #[command(subcommand)]
    command: dapp::Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Failures were already reported to the user by the time they get here.
    match dapp::start(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
