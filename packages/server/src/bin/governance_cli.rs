//! Operator CLI for steward grants and journeys
//!
//! Acts as the system: grants issued here bypass authorization and are
//! audited with actor "system". Output is one JSON document per command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use server_core::common::{GrantId, GrantScope, JourneyId, MemberId};
use server_core::config::Config;
use server_core::domains::auth::{JwtService, SessionIdentity};
use server_core::domains::journeys::Journey;
use server_core::domains::stewards::activities::{grant_as_system, revoke_as_system};
use server_core::domains::stewards::{StewardGrant, StewardGrantData};
use server_core::kernel::{ServerDeps, TracingNotifier};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "governance_cli")]
#[command(about = "Manage steward grants and journeys as the system")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Give a member a global steward grant
    GrantGlobal { member_id: Uuid },

    /// Give a member a steward grant for one journey
    GrantJourney { member_id: Uuid, journey_id: Uuid },

    /// Revoke any grant, global ones included
    Revoke { grant_id: Uuid },

    /// List grants, optionally for one member
    ListGrants {
        #[arg(long)]
        member_id: Option<Uuid>,
    },

    /// Create a journey owned by a member
    CreateJourney {
        #[arg(long)]
        owner_id: Uuid,
        #[arg(long)]
        name: String,
    },

    /// Issue a session token (development)
    IssueToken {
        member_id: Uuid,
        #[arg(long, default_value = "Operator")]
        display_name: String,
        #[arg(long)]
        steward: bool,
    },
}

#[derive(Serialize)]
struct Response<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn output<T: Serialize>(data: T) -> Result<()> {
    let resp = Response {
        success: true,
        message: None,
        data: Some(data),
    };
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

fn output_error(message: String) -> Result<()> {
    let resp: Response<()> = Response {
        success: false,
        message: Some(message),
        data: None,
    };
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::IssueToken {
            member_id,
            display_name,
            steward,
        } => {
            let jwt = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone());
            let token = jwt.issue(&SessionIdentity {
                member_id: MemberId::from_uuid(member_id),
                display_name,
                claims_steward: steward,
            })?;
            output(serde_json::json!({ "token": token }))
        }
        command => {
            let deps = get_deps(&config).await?;
            run(command, &deps).await
        }
    }
}

async fn get_deps(config: &Config) -> Result<ServerDeps> {
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(ServerDeps::new(
        pool,
        Arc::new(TracingNotifier),
        Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
        config.intake_limits,
    ))
}

async fn run(command: Commands, deps: &ServerDeps) -> Result<()> {
    match command {
        Commands::GrantGlobal { member_id } => {
            match grant_as_system(MemberId::from_uuid(member_id), GrantScope::Global, deps).await {
                Ok(grant) => output(StewardGrantData::from(grant)),
                Err(e) => output_error(e.to_string()),
            }
        }
        Commands::GrantJourney {
            member_id,
            journey_id,
        } => {
            let journey_id = JourneyId::from_uuid(journey_id);
            if Journey::find_by_id(journey_id, &deps.db_pool).await?.is_none() {
                return output_error(format!("Journey {} does not exist", journey_id));
            }
            match grant_as_system(
                MemberId::from_uuid(member_id),
                GrantScope::Journey(journey_id),
                deps,
            )
            .await
            {
                Ok(grant) => output(StewardGrantData::from(grant)),
                Err(e) => output_error(e.to_string()),
            }
        }
        Commands::Revoke { grant_id } => {
            match revoke_as_system(GrantId::from_uuid(grant_id), deps).await {
                Ok(grant) => output(StewardGrantData::from(grant)),
                Err(e) => output_error(e.to_string()),
            }
        }
        Commands::ListGrants { member_id } => {
            let grants =
                StewardGrant::list(member_id.map(MemberId::from_uuid), &deps.db_pool).await?;
            output(
                grants
                    .into_iter()
                    .map(StewardGrantData::from)
                    .collect::<Vec<_>>(),
            )
        }
        Commands::CreateJourney { owner_id, name } => {
            let journey =
                Journey::create(MemberId::from_uuid(owner_id), &name, &deps.db_pool).await?;
            output(journey)
        }
        Commands::IssueToken { .. } => output_error("issue-token needs no database".to_string()),
    }
}
