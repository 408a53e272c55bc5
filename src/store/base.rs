use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{memory_store::MemoryStore, mongodb_store::MongoStore};
use crate::config::{StoreBackend, StoreConfig};
use crate::models::{ClaimRequest, Donation, DonationPatch, DonationStatus, NewDonation};

/// Sort order for the available-donations listing, by expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySort {
    Asc,
    Desc,
}

impl ExpirySort {
    /// Parses the `?sort=` query value. The frontend sends "dsc", not "desc".
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(ExpirySort::Asc),
            "dsc" => Some(ExpirySort::Desc),
            _ => None,
        }
    }
}

/// Result of an update/upsert, mirrored directly into response bodies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

/// Result of a delete, mirrored directly into response bodies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// The Store trait abstracts the donation and claim-request collections.
/// Handlers receive it as an injected `Arc<dyn Store>`; there is no global
/// client. Errors are opaque strings that surface as 500s.
#[async_trait]
pub trait Store: Send + Sync {
    /// Donations with `status == Available`, optionally filtered by a
    /// case-insensitive substring of the food name and sorted by expiry.
    /// Without a sort the store's natural order applies.
    async fn list_available(
        &self,
        search: Option<&str>,
        sort: Option<ExpirySort>,
    ) -> Result<Vec<Donation>, String>;

    /// Top-`limit` donations by quantity, descending.
    async fn list_featured(&self, limit: i64) -> Result<Vec<Donation>, String>;

    /// Inserts a donation and returns its store-assigned id.
    async fn insert_donation(&self, donation: &NewDonation) -> Result<String, String>;

    async fn find_donation(&self, id: &str) -> Result<Option<Donation>, String>;

    async fn donations_by_donator(&self, email: &str) -> Result<Vec<Donation>, String>;

    /// updateOne with upsert: an unknown id inserts a new record carrying the
    /// patch fields.
    async fn upsert_donation(&self, id: &str, patch: &DonationPatch)
        -> Result<UpdateOutcome, String>;

    async fn set_donation_status(
        &self,
        id: &str,
        status: DonationStatus,
    ) -> Result<UpdateOutcome, String>;

    async fn delete_donation(&self, id: &str) -> Result<DeleteOutcome, String>;

    /// Inserts a claim request and returns its store-assigned id.
    async fn insert_claim(&self, claim: &ClaimRequest) -> Result<String, String>;

    async fn claims_by_requester(&self, email: &str) -> Result<Vec<ClaimRequest>, String>;

    /// Removes every claim referencing the given donation. Called best-effort
    /// after a donation delete.
    async fn delete_claims_for_donation(&self, food_id: &str) -> Result<DeleteOutcome, String>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub async fn create_store(config: &StoreConfig) -> Arc<dyn Store> {
    match &config.backend {
        StoreBackend::MongoDB(mongo_config) => match MongoStore::new(mongo_config).await {
            Ok(store) => {
                info!("Successfully created MongoDB store.");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to create MongoDB store: {}", e);
                std::process::exit(1);
            }
        },
        StoreBackend::Memory => {
            info!("Using in-memory store.");
            Arc::new(MemoryStore::new())
        }
    }
}
