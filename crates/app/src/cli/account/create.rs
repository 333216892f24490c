use clap::Args;
use gatehouse_app::{
    database,
    domain::accounts::{
        PgAccountsService,
        data::NewAccount,
        records::{AccountRole, AccountUuid},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateAccountArgs {
    /// Account display name
    #[arg(long)]
    name: String,

    /// Account role
    #[arg(long, value_enum)]
    role: AccountRole,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional account UUID; generated when omitted
    #[arg(long)]
    account_uuid: Option<AccountUuid>,
}

pub(crate) async fn run(args: CreateAccountArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let issued = PgAccountsService::new(pool)
        .create_account(NewAccount {
            uuid: args.account_uuid.unwrap_or_default(),
            name: args.name,
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create account: {error}"))?;

    println!("account_uuid: {}", issued.account.uuid);
    println!("account_name: {}", issued.account.name);
    println!("account_role: {}", issued.account.role);
    println!("api_token: {}", issued.api_token.expose());
    println!("store this token now; it is only shown once");

    Ok(())
}
