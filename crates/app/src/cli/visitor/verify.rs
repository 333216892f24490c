use clap::Args;
use gatehouse_app::{
    database::{self, Db},
    domain::visitors::{PgVisitorsService, TokenState, VisitorsService},
};
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct VerifyArgs {
    /// Visitor token as presented at the gate
    #[arg(long)]
    token: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: VerifyArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let state = PgVisitorsService::new(Db::new(pool))
        .verify_token(&args.token, Timestamp::now())
        .await
        .map_err(|error| format!("failed to verify token: {error}"))?;

    println!("status: {}", state.status());

    if let Some(token) = state.token() {
        println!("visitor: {}", token.issued_for_name);
        println!("visit_type: {}", token.visit_type);
        println!("issued_by: {}", token.resident.name);
        println!("expires_at: {}", token.expires_at);
    }

    match &state {
        TokenState::Expired { expired_for, .. } => {
            println!("expired_for: {expired_for:#}");
        }
        TokenState::GrantedActive { entry, .. } => {
            println!("entered_at: {}", entry.entered_at);
            println!("granted_by: {}", entry.guard.name);
        }
        TokenState::UsedAndExited {
            last_entry: Some(entry),
            ..
        } => {
            if let Some(exit) = entry.exit {
                println!("exited_at: {}", exit.exited_at);
                println!("duration_minutes: {}", exit.duration_minutes);
            }
        }
        TokenState::NotFound
        | TokenState::ValidUnused { .. }
        | TokenState::UsedAndExited { .. } => {}
    }

    Ok(())
}
