//! # enroll — operon reference application
//!
//! Composition root that wires the adapters into the enrollment service.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env var overrides)
//! - Initialize logging via `tracing-subscriber`
//! - Build the `SQLite` transaction provider and prepare the members table
//! - Construct the `RegisterMember` service from CLI arguments and the
//!   configured operator, then drive its lifecycle
//! - Report the settled outcome (and recorded errors) on the console
//!
//! ## Dependency rule
//! This is the **only** crate that depends on every other crate. It is the
//! wiring layer — no domain logic belongs here.

use serde_json::{Map, Value};

use enroll::config::Config;
use enroll::operator::Operator;
use enroll::services::register_member::{RegisterMember, ensure_members_table};
use operon_adapter_txn_sqlite_sqlx::Config as ProviderConfig;
use operon_core::service::Service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    // CLI: enroll <email> [display-name] [--founding]
    let mut email = None;
    let mut display_name = None;
    let mut founding = false;
    for arg in std::env::args().skip(1) {
        if arg == "--founding" {
            founding = true;
        } else if email.is_none() {
            email = Some(arg);
        } else if display_name.is_none() {
            display_name = Some(arg);
        } else {
            anyhow::bail!("usage: enroll <email> [display-name] [--founding]");
        }
    }
    let Some(email) = email else {
        anyhow::bail!("usage: enroll <email> [display-name] [--founding]");
    };

    let mut arguments = Map::new();
    arguments.insert("email".to_string(), Value::String(email));
    if let Some(name) = display_name {
        arguments.insert("display_name".to_string(), Value::String(name));
    }
    if founding {
        arguments.insert("founding".to_string(), Value::Bool(true));
    }

    let operator = Operator {
        name: config.operator.name.clone(),
        admin: config.operator.admin,
    };

    // Transaction provider
    let provider = ProviderConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    ensure_members_table(provider.pool()).await?;

    // Service
    let mut service = RegisterMember::new(operator, arguments, provider);
    service.execute().await?;

    if service.succeeded() {
        let id = service.member_id().unwrap_or_default();
        println!("enrolled member #{id}");
        Ok(())
    } else {
        eprintln!("enrollment rejected:");
        for (field, messages) in service.errors().iter() {
            eprintln!("  {field}: {}", messages.join(", "));
        }
        std::process::exit(1);
    }
}
