pub mod claim;
pub mod donation;
pub mod identity;

pub use claim::{ClaimPayload, ClaimRequest, EnrichedClaim};
pub use donation::{Donation, DonationPatch, DonationStatus, NewDonation};
pub use identity::Identity;
