//! Donation endpoints: public listings and authenticated CRUD.

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{Donation, DonationPatch, Identity, NewDonation};
use crate::state::AppState;
use crate::store::{DeleteOutcome, ExpirySort, UpdateOutcome};
use crate::utils::http_helpers::ApiError;

/// Fallback for a missing or unusable `?size=` on the featured listing.
const DEFAULT_FEATURED_SIZE: i64 = 6;

/// Registers donation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_available).post(create_donation))
        .route("/featuredFood", get(list_featured))
        .route("/food/:id", get(get_donation).delete(delete_donation))
        .route("/foods/:email", get(list_by_donator))
        .route("/food/update/:id", put(update_donation))
}

#[derive(Deserialize)]
struct ListQuery {
    search: Option<String>,
    sort: Option<String>,
}

/// Lists donations still up for grabs, with optional name search and
/// expiry sort. Unrecognized sort values mean "natural order".
async fn list_available(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Donation>>, ApiError> {
    let sort = query.sort.as_deref().and_then(ExpirySort::from_query);
    let donations = state
        .store
        .list_available(query.search.as_deref(), sort)
        .await
        .map_err(ApiError::Store)?;

    Ok(Json(donations))
}

#[derive(Deserialize)]
struct FeaturedQuery {
    size: Option<String>,
}

/// Top-N donations by quantity. A missing, unparsable, or non-positive
/// `?size=` coerces to the default rather than erroring.
async fn list_featured(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<Vec<Donation>>, ApiError> {
    let size = query
        .size
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_FEATURED_SIZE);

    let donations = state
        .store
        .list_featured(size)
        .await
        .map_err(ApiError::Store)?;

    Ok(Json(donations))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationResponse {
    pub inserted_id: String,
}

/// Creates a donation. The payload is validated into a typed record at the
/// boundary; a missing or mistyped required field is a 400, not a 422 or a
/// silently-inserted partial document.
async fn create_donation(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<CreateDonationResponse>, ApiError> {
    let donation: NewDonation = serde_json::from_value(payload)
        .map_err(|e| ApiError::InvalidPayload(format!("Invalid donation payload: {}", e)))?;

    let inserted_id = state
        .store
        .insert_donation(&donation)
        .await
        .map_err(ApiError::Store)?;

    Ok(Json(CreateDonationResponse { inserted_id }))
}

/// Fetches one donation by id. Requires authentication.
async fn get_donation(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Donation>, ApiError> {
    let donation = state
        .store
        .find_donation(&id)
        .await
        .map_err(ApiError::Store)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(donation))
}

/// Lists the donations a donator has posted. Owner-only: the authenticated
/// email must match the path email.
async fn list_by_donator(
    identity: Identity,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Donation>>, ApiError> {
    identity.require_owner(&email)?;

    let donations = state
        .store
        .donations_by_donator(&email)
        .await
        .map_err(ApiError::Store)?;

    Ok(Json(donations))
}

/// Upserts donation fields: an unknown id inserts a new record carrying
/// the given fields.
async fn update_donation(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let patch: DonationPatch = serde_json::from_value(payload)
        .map_err(|e| ApiError::InvalidPayload(format!("Invalid donation patch: {}", e)))?;

    let outcome = state
        .store
        .upsert_donation(&id, &patch)
        .await
        .map_err(ApiError::Store)?;

    Ok(Json(outcome))
}

/// Deletes a donation, then prunes dependent claim requests. The pruning is
/// best-effort: its failure is logged and does not roll back or fail the
/// primary delete (the two collections share no transaction).
async fn delete_donation(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    let outcome = state
        .store
        .delete_donation(&id)
        .await
        .map_err(ApiError::Store)?;

    if let Err(e) = state.store.delete_claims_for_donation(&id).await {
        warn!(
            "Failed to prune claim requests for deleted donation '{}': {}",
            id, e
        );
    }

    Ok(Json(outcome))
}
