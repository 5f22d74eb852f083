//! Subcommand handlers. Each `run_*` takes its parsed args, the project
//! root and the resolved [`OutputMode`](crate::output::OutputMode).

pub mod config;
pub mod invite;
pub mod plans;
pub mod progress;
pub mod query;
pub mod tables;
pub mod whoami;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use sopline_core::config::resolve_config;
use sopline_core::model::Person;
use sopline_core::{Client, RecordStore, Table, connect};

/// Resolve configuration and build a client over freshly seeded fixtures.
pub fn open_client(project_root: &Path) -> Result<Client> {
    let config = resolve_config(project_root)?;
    connect(&config.project.backend, Arc::new(RecordStore::seeded())).context("Failed to open data client")
}

/// Profile of the signed-in user, if one exists.
pub async fn current_profile(client: &Client) -> Result<Option<Person>> {
    let Some(user) = client.auth.get_user().await.data.user else {
        return Ok(None);
    };
    let profile = client
        .from(Table::People)
        .select("*")
        .eq("id", user.id.as_str())
        .single()
        .await
        .into_record::<Person>()?;
    Ok(profile)
}
