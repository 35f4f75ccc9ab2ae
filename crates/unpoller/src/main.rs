mod cli;
mod dump;
mod error;
mod start;

use clap::Parser;

use crate::cli::Cli;
use crate::error::exit_code;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match start::run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
