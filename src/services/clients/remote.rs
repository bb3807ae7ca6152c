use anyhow::Context;
use async_trait::async_trait;

use super::{AddressApi, BookingApi, BookingReceipt};
use crate::models::{AddressRecord, SubmissionPayload};

pub struct RemoteBookingApi {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteBookingApi {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BookingApi for RemoteBookingApi {
    async fn create_booking(&self, payload: &SubmissionPayload) -> anyhow::Result<BookingReceipt> {
        let url = format!("{}/bookings", self.base_url.trim_end_matches('/'));

        let receipt = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .context("failed to reach booking endpoint")?
            .error_for_status()
            .context("booking endpoint returned error")?
            .json::<BookingReceipt>()
            .await
            .context("failed to decode booking receipt")?;

        Ok(receipt)
    }
}

pub struct RemoteAddressApi {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteAddressApi {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AddressApi for RemoteAddressApi {
    async fn list_addresses(&self, user_id: &str) -> anyhow::Result<Vec<AddressRecord>> {
        let url = format!(
            "{}/users/{}/addresses",
            self.base_url.trim_end_matches('/'),
            user_id
        );

        let addresses = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to reach address service")?
            .error_for_status()
            .context("address service returned error")?
            .json::<Vec<AddressRecord>>()
            .await
            .context("failed to decode address list")?;

        Ok(addresses)
    }
}
