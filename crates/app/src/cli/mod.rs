use clap::{Parser, Subcommand};

mod account;
mod db;
mod visitor;

#[derive(Debug, Parser)]
#[command(name = "gatehouse-app", about = "Gatehouse CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Account(account::AccountCommand),
    Db(db::DbCommand),
    Visitor(visitor::VisitorCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Account(command) => account::run(command).await,
            Commands::Db(command) => db::run(command).await,
            Commands::Visitor(command) => visitor::run(command).await,
        }
    }
}
