//! Claim-request endpoints: filing a claim on a donation and listing one's
//! own claims.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{ClaimPayload, DonationStatus, EnrichedClaim, Identity};
use crate::state::AppState;
use crate::store::UpdateOutcome;
use crate::utils::http_helpers::ApiError;

/// Registers claim-request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/food/:id", post(create_claim))
        .route("/requests", get(list_own_claims))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimResponse {
    pub donation_update: UpdateOutcome,
    pub inserted_id: String,
}

/// Files a claim on a donation for the authenticated caller.
///
/// Two-step saga: flip the donation's status to `Requested`, then insert the
/// claim record. The steps are not atomic; a crash between them leaves the
/// donation `Requested` with no claim record, which is an accepted
/// inconsistency window. Concurrent claims on the same donation can both
/// succeed for the same reason.
async fn create_claim(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<ClaimPayload>>,
) -> Result<Json<CreateClaimResponse>, ApiError> {
    // Claiming a nonexistent donation is a 404 before any write happens,
    // so no orphan claim is ever inserted.
    state
        .store
        .find_donation(&id)
        .await
        .map_err(ApiError::Store)?
        .ok_or(ApiError::NotFound)?;

    let donation_update = state
        .store
        .set_donation_status(&id, DonationStatus::Requested)
        .await
        .map_err(ApiError::Store)?;

    let claim = payload
        .map(|Json(p)| p)
        .unwrap_or_default()
        .into_claim(id.clone(), identity.email.clone());

    let inserted_id = state
        .store
        .insert_claim(&claim)
        .await
        .map_err(ApiError::Store)?;

    info!("'{}' filed claim '{}' on donation '{}'", identity.email, inserted_id, id);

    Ok(Json(CreateClaimResponse {
        donation_update,
        inserted_id,
    }))
}

#[derive(Deserialize)]
struct OwnClaimsQuery {
    email: Option<String>,
}

/// Lists the caller's claim requests, enriched at read time with fields from
/// the referenced donations. Claims whose donation has been deleted are
/// returned unenriched rather than omitted. Owner-only: asking for another
/// email is a 403.
async fn list_own_claims(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<OwnClaimsQuery>,
) -> Result<Json<Vec<EnrichedClaim>>, ApiError> {
    let email = query.email.unwrap_or_else(|| identity.email.clone());
    identity.require_owner(&email)?;

    let claims = state
        .store
        .claims_by_requester(&email)
        .await
        .map_err(ApiError::Store)?;

    let mut enriched = Vec::with_capacity(claims.len());
    for claim in claims {
        let donation = state
            .store
            .find_donation(&claim.food_id)
            .await
            .map_err(ApiError::Store)?;
        enriched.push(EnrichedClaim::from_parts(claim, donation.as_ref()));
    }

    Ok(Json(enriched))
}
