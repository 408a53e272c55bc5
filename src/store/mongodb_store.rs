use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{ClientOptions, FindOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::models::{ClaimRequest, Donation, DonationPatch, DonationStatus, NewDonation};
use crate::store::{DeleteOutcome, ExpirySort, Store, UpdateOutcome};

/// The config struct for MongoDB connections.
/// Contains the URI and database name.
#[derive(Deserialize, Serialize, JsonSchema, Debug)]
pub struct MongoDBConfig {
    pub uri: String,
    pub database: String,
}

/// A concrete `Store` implementation that uses MongoDB.
///
/// This struct holds references to two collections:
/// - `food_collection`: the donation records
/// - `request_collection`: the claim requests referencing them
pub struct MongoStore {
    food_collection: Collection<DonationDocument>,
    request_collection: Collection<ClaimDocument>,
}

/// Document shape for donations. Fields beyond the name/quantity pair are
/// optional so that sparse upsert-created records still deserialize.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct DonationDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    food_name: String,
    #[serde(default)]
    quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expired_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    donator_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    donator_name: Option<String>,
    #[serde(default)]
    status: DonationStatus,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Document shape for claim requests.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct ClaimDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    food_id: String,
    requester_email: String,
    requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl MongoStore {
    /// Creates a new `MongoStore` from the given config.
    /// It initializes the client connection and sets up indexes.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, String> {
        info!("Connecting to MongoDB at URI: {}", config.uri);

        // Parse the connection string from the config
        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| format!("Failed to parse MongoDB URI: {}", e))?;

        // Optionally set the client application name
        client_options.app_name = Some("foodbridge".to_string());

        // Create a new MongoDB client
        let client = Client::with_options(client_options)
            .map_err(|e| format!("Failed to create MongoDB client: {}", e))?;

        info!("MongoDB connection established successfully.");

        // Retrieve the specified database and relevant collections
        let database = client.database(&config.database);
        let food_collection = database.collection::<DonationDocument>("foods");
        let request_collection = database.collection::<ClaimDocument>("requests");

        // Setup indexes for the hot query paths

        // 1) Status index, for the available-donations listing
        let mut status_index = IndexModel::default();
        status_index.keys = doc! { "status": 1 };

        food_collection
            .create_index(status_index, None)
            .await
            .map_err(|e| format!("Failed to create index on status: {}", e))?;

        // 2) food_id index on claims, for enrichment lookups and cascade deletes
        let mut food_id_index = IndexModel::default();
        food_id_index.keys = doc! { "food_id": 1 };

        request_collection
            .create_index(food_id_index, None)
            .await
            .map_err(|e| format!("Failed to create index on food_id: {}", e))?;

        Ok(Self {
            food_collection,
            request_collection,
        })
    }

    /// Helper function to convert a `NewDonation` into our `DonationDocument`.
    fn new_donation_to_doc(donation: &NewDonation) -> DonationDocument {
        DonationDocument {
            id: ObjectId::new(),
            food_name: donation.food_name.clone(),
            quantity: donation.quantity,
            expired_date: Some(donation.expired_date),
            location: Some(donation.location.clone()),
            donator_email: Some(donation.donator_email.clone()),
            donator_name: donation.donator_name.clone(),
            status: DonationStatus::Available,
            extra: donation.extra.clone(),
        }
    }

    /// Convert a `DonationDocument` back into a `Donation`, with the
    /// ObjectId rendered as a hex string at the API surface.
    fn doc_to_donation(doc: &DonationDocument) -> Donation {
        Donation {
            id: doc.id.to_hex(),
            food_name: doc.food_name.clone(),
            quantity: doc.quantity,
            expired_date: doc.expired_date,
            location: doc.location.clone(),
            donator_email: doc.donator_email.clone(),
            donator_name: doc.donator_name.clone(),
            status: doc.status,
            extra: doc.extra.clone(),
        }
    }

    /// Convert a `ClaimRequest` to a `ClaimDocument` with a fresh ObjectId.
    fn claim_to_doc(claim: &ClaimRequest) -> ClaimDocument {
        ClaimDocument {
            id: ObjectId::new(),
            food_id: claim.food_id.clone(),
            requester_email: claim.requester_email.clone(),
            requested_at: claim.requested_at,
            notes: claim.notes.clone(),
            extra: claim.extra.clone(),
        }
    }

    /// Convert a `ClaimDocument` back to a `ClaimRequest`.
    fn doc_to_claim(doc: &ClaimDocument) -> ClaimRequest {
        ClaimRequest {
            id: doc.id.to_hex(),
            food_id: doc.food_id.clone(),
            requester_email: doc.requester_email.clone(),
            requested_at: doc.requested_at,
            notes: doc.notes.clone(),
            extra: doc.extra.clone(),
        }
    }

    async fn drain_donations(
        &self,
        filter: Document,
        options: Option<FindOptions>,
    ) -> Result<Vec<Donation>, String> {
        let mut cursor = self
            .food_collection
            .find(filter, options)
            .await
            .map_err(|e| format!("Failed to list donations: {}", e))?;

        let mut donations = Vec::new();
        while let Some(food_doc) = cursor
            .try_next()
            .await
            .map_err(|e| format!("Failed to read donation document: {}", e))?
        {
            donations.push(Self::doc_to_donation(&food_doc));
        }

        Ok(donations)
    }
}

/// Builds the upsert update document: the patch fields via `$set`, plus a
/// default `Available` status stamped on insert so upsert-created records
/// match the availability filter. Skipped when the patch itself carries a
/// status, since the server rejects a path named in both operators.
fn upsert_update(patch_doc: Document) -> Document {
    let mut update = Document::new();
    if !patch_doc.contains_key("status") {
        update.insert("$setOnInsert", doc! { "status": "Available" });
    }
    update.insert("$set", patch_doc);
    update
}

/// Escapes regex metacharacters so a search string matches literally.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl UpdateOutcome {
    fn from_result(result: mongodb::results::UpdateResult) -> Self {
        UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id.map(|id| match id {
                Bson::ObjectId(oid) => oid.to_hex(),
                other => other.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn list_available(
        &self,
        search: Option<&str>,
        sort: Option<ExpirySort>,
    ) -> Result<Vec<Donation>, String> {
        let mut filter = doc! { "status": "Available" };
        if let Some(search) = search {
            // Case-insensitive substring match on the food name
            filter.insert(
                "food_name",
                doc! { "$regex": escape_regex(search), "$options": "i" },
            );
        }

        let options = sort.map(|sort| {
            let direction = match sort {
                ExpirySort::Asc => 1,
                ExpirySort::Desc => -1,
            };
            FindOptions::builder()
                .sort(doc! { "expired_date": direction })
                .build()
        });

        self.drain_donations(filter, options).await
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Donation>, String> {
        let options = FindOptions::builder()
            .sort(doc! { "quantity": -1 })
            .limit(limit)
            .build();

        self.drain_donations(doc! {}, Some(options)).await
    }

    async fn insert_donation(&self, donation: &NewDonation) -> Result<String, String> {
        let food_doc = Self::new_donation_to_doc(donation);
        let inserted_id = food_doc.id.to_hex();
        self.food_collection
            .insert_one(food_doc, None)
            .await
            .map_err(|e| format!("Failed to insert donation: {}", e))?;

        Ok(inserted_id)
    }

    async fn find_donation(&self, id: &str) -> Result<Option<Donation>, String> {
        // An id that is not a valid ObjectId cannot match anything.
        let Ok(oid) = ObjectId::parse_str(id) else {
            debug!("Ignoring malformed donation id '{}'", id);
            return Ok(None);
        };

        let food_doc = self
            .food_collection
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(|e| format!("Failed to query donation: {}", e))?;

        Ok(food_doc.map(|doc| Self::doc_to_donation(&doc)))
    }

    async fn donations_by_donator(&self, email: &str) -> Result<Vec<Donation>, String> {
        self.drain_donations(doc! { "donator_email": email }, None)
            .await
    }

    async fn upsert_donation(
        &self,
        id: &str,
        patch: &DonationPatch,
    ) -> Result<UpdateOutcome, String> {
        let oid =
            ObjectId::parse_str(id).map_err(|e| format!("Invalid donation id '{}': {}", id, e))?;

        let patch_doc = mongodb::bson::to_document(patch)
            .map_err(|e| format!("Failed to serialize donation patch: {}", e))?;

        // An empty `$set` is rejected by the server; nothing to write anyway.
        if patch_doc.is_empty() {
            let matched = if self.find_donation(id).await?.is_some() { 1 } else { 0 };
            return Ok(UpdateOutcome {
                matched_count: matched,
                modified_count: 0,
                upserted_id: None,
            });
        }

        let options = UpdateOptions::builder().upsert(true).build();
        let result = self
            .food_collection
            .update_one(doc! { "_id": oid }, upsert_update(patch_doc), options)
            .await
            .map_err(|e| format!("Failed to upsert donation: {}", e))?;

        Ok(UpdateOutcome::from_result(result))
    }

    async fn set_donation_status(
        &self,
        id: &str,
        status: DonationStatus,
    ) -> Result<UpdateOutcome, String> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            debug!("Ignoring malformed donation id '{}'", id);
            return Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
                upserted_id: None,
            });
        };

        let status = mongodb::bson::to_bson(&status)
            .map_err(|e| format!("Failed to serialize status: {}", e))?;

        let result = self
            .food_collection
            .update_one(doc! { "_id": oid }, doc! { "$set": { "status": status } }, None)
            .await
            .map_err(|e| format!("Failed to update donation status: {}", e))?;

        Ok(UpdateOutcome::from_result(result))
    }

    async fn delete_donation(&self, id: &str) -> Result<DeleteOutcome, String> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            debug!("Ignoring malformed donation id '{}'", id);
            return Ok(DeleteOutcome { deleted_count: 0 });
        };

        let result = self
            .food_collection
            .delete_one(doc! { "_id": oid }, None)
            .await
            .map_err(|e| format!("Failed to delete donation: {}", e))?;

        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn insert_claim(&self, claim: &ClaimRequest) -> Result<String, String> {
        let claim_doc = Self::claim_to_doc(claim);
        let inserted_id = claim_doc.id.to_hex();
        self.request_collection
            .insert_one(claim_doc, None)
            .await
            .map_err(|e| format!("Failed to insert claim request: {}", e))?;

        Ok(inserted_id)
    }

    async fn claims_by_requester(&self, email: &str) -> Result<Vec<ClaimRequest>, String> {
        let mut cursor = self
            .request_collection
            .find(doc! { "requester_email": email }, None)
            .await
            .map_err(|e| format!("Failed to list claim requests: {}", e))?;

        let mut claims = Vec::new();
        while let Some(claim_doc) = cursor
            .try_next()
            .await
            .map_err(|e| format!("Failed to read claim document: {}", e))?
        {
            claims.push(Self::doc_to_claim(&claim_doc));
        }

        Ok(claims)
    }

    async fn delete_claims_for_donation(&self, food_id: &str) -> Result<DeleteOutcome, String> {
        let result = self
            .request_collection
            .delete_many(doc! { "food_id": food_id }, None)
            .await
            .map_err(|e| format!("Failed to delete dependent claim requests: {}", e))?;

        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClaimPayload;

    fn sample_new_donation() -> NewDonation {
        serde_json::from_value(serde_json::json!({
            "food_name": "Rice",
            "quantity": 10,
            "expired_date": "2026-09-15T00:00:00Z",
            "location": "Tromsø",
            "donator_email": "d@x.com",
        }))
        .unwrap()
    }

    /// Test that converting a donation to a MongoDB document and back
    /// preserves the original data.
    #[test]
    fn test_donation_doc_conversion() {
        let new_donation = sample_new_donation();
        let doc = MongoStore::new_donation_to_doc(&new_donation);
        let donation = MongoStore::doc_to_donation(&doc);

        assert_eq!(donation.id, doc.id.to_hex());
        assert_eq!(donation.food_name, new_donation.food_name);
        assert_eq!(donation.quantity, new_donation.quantity);
        assert_eq!(donation.status, DonationStatus::Available);
    }

    /// Test that converting a claim to a MongoDB document and back
    /// preserves the claim data.
    #[test]
    fn test_claim_doc_conversion() {
        let claim = ClaimPayload::default().into_claim("food-1".into(), "r@x.com".into());
        let doc = MongoStore::claim_to_doc(&claim);
        let claim_converted = MongoStore::doc_to_claim(&doc);

        assert_eq!(claim_converted.food_id, claim.food_id);
        assert_eq!(claim_converted.requester_email, claim.requester_email);
        assert_eq!(claim_converted.requested_at, claim.requested_at);
    }

    /// An upsert-created document must carry an `Available` status so the
    /// availability listing's equality filter matches it, exactly like a
    /// record created through the insert path.
    #[test]
    fn test_upsert_update_stamps_default_status_on_insert() {
        let patch = DonationPatch {
            food_name: Some("Pasta".to_string()),
            quantity: Some(4),
            ..Default::default()
        };
        let patch_doc = mongodb::bson::to_document(&patch).unwrap();
        let update = upsert_update(patch_doc);

        let on_insert = update.get_document("$setOnInsert").unwrap();
        assert_eq!(on_insert.get_str("status").unwrap(), "Available");

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("food_name").unwrap(), "Pasta");
        assert!(!set.contains_key("status"));
    }

    /// A status arriving through the patch's extra fields takes precedence;
    /// the default stamp is dropped so no path appears in both operators.
    #[test]
    fn test_upsert_update_defers_to_patch_status() {
        let mut patch = DonationPatch::default();
        patch
            .extra
            .insert("status".to_string(), serde_json::json!("Requested"));
        let patch_doc = mongodb::bson::to_document(&patch).unwrap();
        let update = upsert_update(patch_doc);

        assert!(!update.contains_key("$setOnInsert"));
        assert_eq!(
            update.get_document("$set").unwrap().get_str("status").unwrap(),
            "Requested"
        );
    }

    #[test]
    fn test_escape_regex_neutralizes_metacharacters() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("plain"), "plain");
    }
}
