//! Card provisioning.
//!
//! The [`Reconciler`] ties a card on the reader to a registry entry:
//!
//! 1. Read the identifier already stored on the card (bounded by the write
//!    timeout).
//! 2. Look it up in the registry.
//! 3. Known card: update the entry, but only when the caller confirmed the
//!    overwrite of exactly that entry. Without confirmation nothing changes
//!    and the existing entry is reported back.
//! 4. Unknown or blank card: insert an entry, then write its id onto the
//!    card in the same reader checkout.
//!
//! The insert happens before the card write. If the write fails the entry
//! stays and [`ProvisionError::CardWritePending`] names it, so the caller can
//! finish with [`Reconciler::retry_write`].

use crate::error::{StorageError, StorageResult};
use crate::models::RegistryEntry;
use crate::repositories::Registry;
use kiddyblaster_core::CardId;
use kiddyblaster_hardware::ReaderDevice;
use kiddyblaster_scan::{ScanError, ScanHandle, Scanner};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What to store for the card on the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub name: String,
    pub uri: String,

    /// Id of the entry the caller agreed to overwrite, after a previous
    /// attempt answered [`ProvisionOutcome::ConfirmationRequired`].
    #[serde(default)]
    pub confirm_overwrite_of: Option<i64>,
}

impl ProvisionRequest {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            confirm_overwrite_of: None,
        }
    }

    /// Confirm overwriting entry `id`.
    pub fn confirm_overwrite_of(mut self, id: i64) -> Self {
        self.confirm_overwrite_of = Some(id);
        self
    }
}

/// Successful result of [`Reconciler::provision`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ProvisionOutcome {
    /// A new entry was created and its id written to the card.
    Allocated { id: i64 },

    /// The card's existing entry was overwritten. The card was not written.
    Updated { id: i64 },

    /// The card already maps to `existing`; nothing was changed.
    ConfirmationRequired { existing: RegistryEntry },
}

/// Errors that end a provisioning attempt.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Reading the card failed before the registry was touched.
    #[error("Card scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Registry error: {0}")]
    Registry(#[from] StorageError),

    /// The allocated id does not fit in the card's identifier field.
    #[error("Registry id {id} cannot be stored on a card")]
    IdentifierOverflow { id: i64 },

    /// The entry exists but its id never reached the card.
    #[error("Registry updated, card write pending for id {id}: {source}")]
    CardWritePending { id: i64, source: ScanError },
}

/// Provisioning workflow over a registry and the shared reader.
#[derive(Debug)]
pub struct Reconciler<G, R> {
    registry: G,
    scanner: Scanner<R>,
}

impl<G: Registry, R: ReaderDevice> Reconciler<G, R> {
    pub fn new(registry: G, scanner: Scanner<R>) -> Self {
        Self { registry, scanner }
    }

    pub fn registry(&self) -> &G {
        &self.registry
    }

    pub fn scanner(&self) -> &Scanner<R> {
        &self.scanner
    }

    /// Provision the card on the reader.
    ///
    /// # Errors
    ///
    /// See [`ProvisionError`]. Confirmation being required is not an error.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        self.provision_with(request, &CancellationToken::new()).await
    }

    /// As [`provision`](Self::provision), stopping early when `cancel` fires.
    pub async fn provision_with(
        &self,
        request: &ProvisionRequest,
        cancel: &CancellationToken,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let mut handle = self.scanner.checkout_bounded().await?;
        let stored = handle
            .scan(Some(self.scanner.config().write_timeout), cancel)
            .await?;

        if let Some(existing) = self.registry.find_by_id(i64::from(stored)).await? {
            return self.reconcile_existing(request, existing).await;
        }

        let id = self.registry.insert(&request.name, &request.uri).await?;
        info!(id, name = %request.name, uri = %request.uri, "registry entry allocated");

        let card_id = CardId::try_from(id).map_err(|_| {
            error!(id, "allocated id does not fit on a card");
            ProvisionError::IdentifierOverflow { id }
        })?;
        self.write(&mut handle, id, card_id, cancel).await?;

        Ok(ProvisionOutcome::Allocated { id })
    }

    async fn reconcile_existing(
        &self,
        request: &ProvisionRequest,
        existing: RegistryEntry,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        if request.confirm_overwrite_of != Some(existing.id) {
            info!(
                id = existing.id,
                name = %existing.name,
                "card already provisioned, confirmation required"
            );
            return Ok(ProvisionOutcome::ConfirmationRequired { existing });
        }

        self.registry
            .update_by_id(existing.id, &request.name, &request.uri)
            .await?;
        info!(id = existing.id, name = %request.name, uri = %request.uri, "registry entry updated");

        Ok(ProvisionOutcome::Updated { id: existing.id })
    }

    /// Write the id of an existing entry onto the card on the reader.
    ///
    /// Completes a provisioning attempt that ended in
    /// [`ProvisionError::CardWritePending`].
    ///
    /// # Errors
    ///
    /// [`ProvisionError::Registry`] if no entry `id` exists,
    /// [`ProvisionError::CardWritePending`] if the write fails again.
    pub async fn retry_write(&self, id: i64) -> Result<CardId, ProvisionError> {
        let card_id = CardId::try_from(id).map_err(|_| ProvisionError::IdentifierOverflow { id })?;
        self.require_entry(id).await?;

        let mut handle = self.scanner.checkout_bounded().await?;
        self.write(&mut handle, id, card_id, &CancellationToken::new())
            .await?;
        info!(id, "pending card write completed");

        Ok(card_id)
    }

    async fn require_entry(&self, id: i64) -> StorageResult<RegistryEntry> {
        self.registry
            .find_by_id(id)
            .await?
            .ok_or_else(|| StorageError::entry_not_found(id))
    }

    async fn write(
        &self,
        handle: &mut ScanHandle<R>,
        id: i64,
        card_id: CardId,
        cancel: &CancellationToken,
    ) -> Result<(), ProvisionError> {
        handle
            .write_id(card_id, Some(self.scanner.config().write_timeout), cancel)
            .await
            .map_err(|source| {
                warn!(id, error = %source, "card write failed, registry entry kept");
                ProvisionError::CardWritePending { id, source }
            })
    }
}
