use clap::Parser;
use smilearb::cli::{check, expiries, scan, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan(args) => scan::execute(&args)
            .await
            .map_err(|e| miette::miette!(code = "smilearb::scan", "{e}")),
        Commands::Expiries(args) => {
            expiries::execute(&args);
            Ok(())
        }
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(&arg.config),
    }
}
