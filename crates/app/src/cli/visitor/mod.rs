use clap::{Args, Subcommand};

mod verify;

#[derive(Debug, Args)]
pub(crate) struct VisitorCommand {
    #[command(subcommand)]
    command: VisitorSubcommand,
}

#[derive(Debug, Subcommand)]
enum VisitorSubcommand {
    /// Report the state of a visitor token without consuming it
    Verify(verify::VerifyArgs),
}

pub(crate) async fn run(command: VisitorCommand) -> Result<(), String> {
    match command.command {
        VisitorSubcommand::Verify(args) => verify::run(args).await,
    }
}
