pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{AddressRecord, SubmissionPayload};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub booking_id: String,
    pub status: String,
}

/// The remote booking-creation endpoint. Fire-and-forget from this side:
/// retries and timeouts are its problem, not ours.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn create_booking(&self, payload: &SubmissionPayload) -> anyhow::Result<BookingReceipt>;
}

/// Saved-address lookup for the address picker. `_id` on the returned
/// records is what ends up in `serviceAddressId`.
#[async_trait]
pub trait AddressApi: Send + Sync {
    async fn list_addresses(&self, user_id: &str) -> anyhow::Result<Vec<AddressRecord>>;
}
