use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ClaimRequest, Donation, DonationPatch, DonationStatus, NewDonation};
use crate::store::{DeleteOutcome, ExpirySort, Store, UpdateOutcome};

/// An in-process `Store` backend with the same observable semantics as the
/// MongoDB one. Used for tests and storeless local development. Insertion
/// order is the natural order.
pub struct MemoryStore {
    foods: RwLock<Vec<Donation>>,
    claims: RwLock<Vec<ClaimRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            foods: RwLock::new(Vec::new()),
            claims: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_available(
        &self,
        search: Option<&str>,
        sort: Option<ExpirySort>,
    ) -> Result<Vec<Donation>, String> {
        let foods = self.foods.read().await;
        let needle = search.map(|s| s.to_lowercase());

        let mut matches: Vec<Donation> = foods
            .iter()
            .filter(|donation| donation.status == DonationStatus::Available)
            .filter(|donation| match &needle {
                Some(needle) => donation.food_name.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();

        match sort {
            Some(ExpirySort::Asc) => matches.sort_by_key(|d| d.expired_date),
            Some(ExpirySort::Desc) => {
                matches.sort_by_key(|d| d.expired_date);
                matches.reverse();
            }
            None => {}
        }

        Ok(matches)
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Donation>, String> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let foods = self.foods.read().await;
        let mut ranked: Vec<Donation> = foods.iter().cloned().collect();
        // Stable sort keeps ties in insertion order.
        ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        ranked.truncate(limit as usize);

        Ok(ranked)
    }

    async fn insert_donation(&self, donation: &NewDonation) -> Result<String, String> {
        let id = Uuid::new_v4().to_string();
        let mut foods = self.foods.write().await;
        foods.push(donation.clone().into_donation(id.clone()));
        Ok(id)
    }

    async fn find_donation(&self, id: &str) -> Result<Option<Donation>, String> {
        let foods = self.foods.read().await;
        Ok(foods.iter().find(|d| d.id == id).cloned())
    }

    async fn donations_by_donator(&self, email: &str) -> Result<Vec<Donation>, String> {
        let foods = self.foods.read().await;
        Ok(foods
            .iter()
            .filter(|d| d.donator_email.as_deref() == Some(email))
            .cloned()
            .collect())
    }

    async fn upsert_donation(
        &self,
        id: &str,
        patch: &DonationPatch,
    ) -> Result<UpdateOutcome, String> {
        let mut foods = self.foods.write().await;
        match foods.iter_mut().find(|d| d.id == id) {
            Some(donation) => {
                patch.apply_to(donation);
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: 1,
                    upserted_id: None,
                })
            }
            None => {
                foods.push(patch.clone().into_donation(id.to_string()));
                Ok(UpdateOutcome {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: Some(id.to_string()),
                })
            }
        }
    }

    async fn set_donation_status(
        &self,
        id: &str,
        status: DonationStatus,
    ) -> Result<UpdateOutcome, String> {
        let mut foods = self.foods.write().await;
        match foods.iter_mut().find(|d| d.id == id) {
            Some(donation) => {
                let modified = donation.status != status;
                donation.status = status;
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                    upserted_id: None,
                })
            }
            None => Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
                upserted_id: None,
            }),
        }
    }

    async fn delete_donation(&self, id: &str) -> Result<DeleteOutcome, String> {
        let mut foods = self.foods.write().await;
        let before = foods.len();
        foods.retain(|d| d.id != id);
        Ok(DeleteOutcome {
            deleted_count: (before - foods.len()) as u64,
        })
    }

    async fn insert_claim(&self, claim: &ClaimRequest) -> Result<String, String> {
        let id = Uuid::new_v4().to_string();
        let mut stored = claim.clone();
        stored.id = id.clone();
        let mut claims = self.claims.write().await;
        claims.push(stored);
        Ok(id)
    }

    async fn claims_by_requester(&self, email: &str) -> Result<Vec<ClaimRequest>, String> {
        let claims = self.claims.read().await;
        Ok(claims
            .iter()
            .filter(|c| c.requester_email == email)
            .cloned()
            .collect())
    }

    async fn delete_claims_for_donation(&self, food_id: &str) -> Result<DeleteOutcome, String> {
        let mut claims = self.claims.write().await;
        let before = claims.len();
        claims.retain(|c| c.food_id != food_id);
        Ok(DeleteOutcome {
            deleted_count: (before - claims.len()) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClaimPayload;

    fn new_donation(name: &str, quantity: i64, expired: &str) -> NewDonation {
        serde_json::from_value(serde_json::json!({
            "food_name": name,
            "quantity": quantity,
            "expired_date": expired,
            "location": "Oslo",
            "donator_email": "d@x.com",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_available_excludes_requested() {
        let store = MemoryStore::new();
        let kept = store
            .insert_donation(&new_donation("Bread", 2, "2026-09-01T00:00:00Z"))
            .await
            .unwrap();
        let claimed = store
            .insert_donation(&new_donation("Soup", 1, "2026-09-02T00:00:00Z"))
            .await
            .unwrap();
        store
            .set_donation_status(&claimed, DonationStatus::Requested)
            .await
            .unwrap();

        let available = store.list_available(None, None).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, kept);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        store
            .insert_donation(&new_donation("Sourdough Bread", 2, "2026-09-01T00:00:00Z"))
            .await
            .unwrap();
        store
            .insert_donation(&new_donation("Soup", 1, "2026-09-02T00:00:00Z"))
            .await
            .unwrap();

        let found = store.list_available(Some("BREAD"), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].food_name, "Sourdough Bread");
    }

    #[tokio::test]
    async fn test_expiry_sort_orders_both_ways() {
        let store = MemoryStore::new();
        store
            .insert_donation(&new_donation("Late", 1, "2026-09-20T00:00:00Z"))
            .await
            .unwrap();
        store
            .insert_donation(&new_donation("Early", 1, "2026-09-01T00:00:00Z"))
            .await
            .unwrap();

        let asc = store
            .list_available(None, Some(ExpirySort::Asc))
            .await
            .unwrap();
        assert_eq!(asc[0].food_name, "Early");

        let desc = store
            .list_available(None, Some(ExpirySort::Desc))
            .await
            .unwrap();
        assert_eq!(desc[0].food_name, "Late");
    }

    #[tokio::test]
    async fn test_featured_is_quantity_descending_with_limit() {
        let store = MemoryStore::new();
        for (name, quantity) in [("small", 1), ("large", 10), ("medium", 5)] {
            store
                .insert_donation(&new_donation(name, quantity, "2026-09-01T00:00:00Z"))
                .await
                .unwrap();
        }

        let top = store.list_featured(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].food_name, "large");
        assert_eq!(top[1].food_name, "medium");
    }

    #[tokio::test]
    async fn test_upsert_inserts_on_unknown_id() {
        let store = MemoryStore::new();
        let patch = DonationPatch {
            food_name: Some("Pasta".to_string()),
            quantity: Some(4),
            ..Default::default()
        };

        let outcome = store.upsert_donation("fresh-id", &patch).await.unwrap();
        assert_eq!(outcome.matched_count, 0);
        assert_eq!(outcome.upserted_id.as_deref(), Some("fresh-id"));

        let inserted = store.find_donation("fresh-id").await.unwrap().unwrap();
        assert_eq!(inserted.food_name, "Pasta");
        assert_eq!(inserted.quantity, 4);
    }

    #[tokio::test]
    async fn test_cascade_delete_of_claims() {
        let store = MemoryStore::new();
        let food_id = store
            .insert_donation(&new_donation("Bread", 2, "2026-09-01T00:00:00Z"))
            .await
            .unwrap();
        let claim = ClaimPayload::default().into_claim(food_id.clone(), "r@x.com".into());
        store.insert_claim(&claim).await.unwrap();

        store.delete_donation(&food_id).await.unwrap();
        let pruned = store.delete_claims_for_donation(&food_id).await.unwrap();
        assert_eq!(pruned.deleted_count, 1);
        assert!(store
            .claims_by_requester("r@x.com")
            .await
            .unwrap()
            .is_empty());
    }
}
