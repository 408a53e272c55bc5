use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of a donation. The only transition is
/// `Available -> Requested`, performed by the claim-request flow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DonationStatus {
    #[default]
    Available,
    Requested,
}

/// A food-donation record. Records created through the API always carry the
/// full set of fields; records created by upserting an unknown id may be
/// sparse, so everything beyond the name/quantity pair is optional here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Donation {
    pub id: String,
    #[serde(default)]
    pub food_name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_name: Option<String>,
    #[serde(default)]
    pub status: DonationStatus,
    /// Arbitrary descriptive fields (image URL, pickup notes, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Creation payload. Deserialization failure means a missing or mistyped
/// required field and surfaces as a 400.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewDonation {
    pub food_name: String,
    pub quantity: i64,
    pub expired_date: DateTime<Utc>,
    pub location: String,
    pub donator_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewDonation {
    /// Materialize the record an insert produces, with the store-assigned id.
    pub fn into_donation(self, id: String) -> Donation {
        Donation {
            id,
            food_name: self.food_name,
            quantity: self.quantity,
            expired_date: Some(self.expired_date),
            location: Some(self.location),
            donator_email: Some(self.donator_email),
            donator_name: self.donator_name,
            status: DonationStatus::Available,
            extra: self.extra,
        }
    }
}

/// Upsert payload: every field optional, only present fields are written.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DonationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DonationPatch {
    /// Apply this patch onto an existing record, leaving absent fields alone.
    pub fn apply_to(&self, donation: &mut Donation) {
        if let Some(food_name) = &self.food_name {
            donation.food_name = food_name.clone();
        }
        if let Some(quantity) = self.quantity {
            donation.quantity = quantity;
        }
        if let Some(expired_date) = self.expired_date {
            donation.expired_date = Some(expired_date);
        }
        if let Some(location) = &self.location {
            donation.location = Some(location.clone());
        }
        if let Some(donator_email) = &self.donator_email {
            donation.donator_email = Some(donator_email.clone());
        }
        if let Some(donator_name) = &self.donator_name {
            donation.donator_name = Some(donator_name.clone());
        }
        for (key, value) in &self.extra {
            donation.extra.insert(key.clone(), value.clone());
        }
    }

    /// The sparse record an upsert inserts when no donation matches the id.
    pub fn into_donation(self, id: String) -> Donation {
        let mut donation = Donation {
            id,
            food_name: String::new(),
            quantity: 0,
            expired_date: None,
            location: None,
            donator_email: None,
            donator_name: None,
            status: DonationStatus::Available,
            extra: Map::new(),
        };
        self.apply_to(&mut donation);
        donation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_plain_string() {
        assert_eq!(
            serde_json::to_value(DonationStatus::Available).unwrap(),
            serde_json::json!("Available")
        );
        assert_eq!(
            serde_json::to_value(DonationStatus::Requested).unwrap(),
            serde_json::json!("Requested")
        );
    }

    #[test]
    fn test_new_donation_rejects_missing_fields() {
        let missing_quantity = serde_json::json!({
            "food_name": "Bread",
            "expired_date": "2026-09-01T00:00:00Z",
            "location": "Oslo",
            "donator_email": "a@x.com",
        });
        assert!(serde_json::from_value::<NewDonation>(missing_quantity).is_err());
    }

    #[test]
    fn test_new_donation_keeps_extra_fields() {
        let payload = serde_json::json!({
            "food_name": "Bread",
            "quantity": 3,
            "expired_date": "2026-09-01T00:00:00Z",
            "location": "Oslo",
            "donator_email": "a@x.com",
            "food_image": "https://example.com/bread.png",
        });
        let parsed: NewDonation = serde_json::from_value(payload).unwrap();
        assert_eq!(
            parsed.extra.get("food_image").and_then(|v| v.as_str()),
            Some("https://example.com/bread.png")
        );
    }

    #[test]
    fn test_patch_leaves_absent_fields_alone() {
        let base = serde_json::json!({
            "food_name": "Bread",
            "quantity": 3,
            "expired_date": "2026-09-01T00:00:00Z",
            "location": "Oslo",
            "donator_email": "a@x.com",
        });
        let new_donation: NewDonation = serde_json::from_value(base).unwrap();
        let mut donation = new_donation.into_donation("id-1".to_string());

        let patch = DonationPatch {
            quantity: Some(5),
            ..Default::default()
        };
        patch.apply_to(&mut donation);

        assert_eq!(donation.quantity, 5);
        assert_eq!(donation.food_name, "Bread");
        assert_eq!(donation.location.as_deref(), Some("Oslo"));
        assert_eq!(donation.status, DonationStatus::Available);
    }
}
