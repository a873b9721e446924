use clap::{Parser, ValueEnum};
use drivebridge_config::Settings;
use drivebridge_services::{AuthService, auth::Role};

/// Issue a bearer token for the drivebridge admin API.
#[derive(Debug, Parser)]
#[command(name = "drivebridge-token", version)]
struct Args {
    /// Subject the token is issued to
    #[arg(default_value = "admin")]
    username: String,

    #[arg(long, value_enum, default_value_t = RoleArg::Administrator)]
    role: RoleArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Administrator,
    Editor,
    Subscriber,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Administrator => Role::Administrator,
            RoleArg::Editor => Role::Editor,
            RoleArg::Subscriber => Role::Subscriber,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::load()?;
    let auth = AuthService::new(settings.auth);
    let token = auth.issue_token(&args.username, args.role.into())?;

    println!("{}", token);
    Ok(())
}
