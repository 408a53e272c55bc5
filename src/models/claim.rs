use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::donation::Donation;

/// A user's request to receive a specific donation. `food_id` is a
/// foreign-key-style reference to the donation; the donation is the owning
/// record and dependent claims are pruned when it is deleted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClaimRequest {
    pub id: String,
    pub food_id: String,
    pub requester_email: String,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Optional body for the claim-creation call.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ClaimPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClaimPayload {
    pub fn into_claim(self, food_id: String, requester_email: String) -> ClaimRequest {
        ClaimRequest {
            // The store assigns the real id on insert.
            id: String::new(),
            food_id,
            requester_email,
            requested_at: Utc::now(),
            notes: self.notes,
            extra: self.extra,
        }
    }
}

/// A claim as returned to its owner: the stored record plus donation fields
/// denormalized at read time. All enrichment fields stay `None` when the
/// referenced donation no longer exists -- the claim itself is still listed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EnrichedClaim {
    #[serde(flatten)]
    pub claim: ClaimRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EnrichedClaim {
    pub fn from_parts(claim: ClaimRequest, donation: Option<&Donation>) -> Self {
        match donation {
            Some(donation) => EnrichedClaim {
                claim,
                food_name: Some(donation.food_name.clone()),
                donator_name: donation.donator_name.clone(),
                expired_date: donation.expired_date,
                location: donation.location.clone(),
            },
            None => EnrichedClaim {
                claim,
                food_name: None,
                donator_name: None,
                expired_date: None,
                location: None,
            },
        }
    }
}
