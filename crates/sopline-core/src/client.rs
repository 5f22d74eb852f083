//! Client factory: the single switch between the development mock and the
//! hosted backend.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::AuthStub;
use crate::config::BackendConfig;
use crate::error::{ClientError, StoreError};
use crate::query::QueryBuilder;
use crate::store::{RecordStore, Table};

/// Data-access handle with the hosted client's shape: `client.auth` for
/// identity and `client.from(table)` for queries.
#[derive(Debug, Clone)]
pub struct Client {
    pub auth: AuthStub,
    store: Arc<RecordStore>,
}

impl Client {
    /// A client served entirely from `store`.
    #[must_use]
    pub fn mock(store: Arc<RecordStore>) -> Self {
        Self {
            auth: AuthStub::new(Arc::clone(&store)),
            store,
        }
    }

    /// Start a query against `table`.
    pub fn from(&self, table: Table) -> QueryBuilder {
        QueryBuilder::new(Arc::clone(&self.store), table)
    }

    /// Start a query against a table named on the wire (`"sops"`,
    /// `"step_completions"`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTable`] if the name matches no table.
    pub fn from_name(&self, name: &str) -> Result<QueryBuilder, StoreError> {
        Ok(self.from(name.parse()?))
    }

    /// The store backing this client.
    #[must_use]
    pub const fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }
}

/// Build a client for `backend`.
///
/// # Errors
///
/// Returns [`ClientError::RemoteBackendUnavailable`] unless the development
/// mock is enabled.
pub fn connect(backend: &BackendConfig, store: Arc<RecordStore>) -> Result<Client, ClientError> {
    if backend.dev_mock {
        info!(owner = store.owner_id(), "using in-memory development backend");
        return Ok(Client::mock(store));
    }

    warn!(url = backend.url.as_deref().unwrap_or("<unset>"), "hosted backend requested");
    Err(ClientError::RemoteBackendUnavailable {
        url: backend.url.clone(),
    })
}
