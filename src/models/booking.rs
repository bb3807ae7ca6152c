use serde::{Deserialize, Serialize};

/// Coordinates captured at send-request time. Independent of the saved
/// service address — this is wherever the customer happened to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

/// The booking-in-progress. Every field is optional until the page that
/// owns it fills it in; the record is only validated at submission time.
///
/// Serialized camelCase because the stored JSON shape predates this
/// service and existing clients still read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_booking_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_more_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_of_lead: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
}

/// Which of the two mutually exclusive booking flows is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingFlow {
    Direct,
    ServiceCenter(String),
}

impl BookingState {
    /// Derives the active flow from the provider id. Storage round-trips
    /// through older clients can turn a JSON `null` into the literal string
    /// `"null"`, so that value counts as "no provider" here, in one place,
    /// rather than at every call site.
    pub fn flow(&self) -> BookingFlow {
        match self.provider_id.as_deref() {
            Some(id) if !id.trim().is_empty() && id != "null" => {
                BookingFlow::ServiceCenter(id.to_string())
            }
            _ => BookingFlow::Direct,
        }
    }

    /// Shallow merge: fields present in the patch win, omitted fields keep
    /// their prior value. `user_location` is replaced wholesale, never
    /// merged field-by-field.
    pub fn apply(&mut self, patch: BookingPatch) {
        if let Some(v) = patch.service_id {
            self.service_id = Some(v);
        }
        if let Some(v) = patch.provider_id {
            self.provider_id = Some(v);
        }
        if let Some(v) = patch.booked_date {
            self.booked_date = Some(v);
        }
        if let Some(v) = patch.booked_time {
            self.booked_time = Some(v);
        }
        if let Some(v) = patch.service_address_id {
            self.service_address_id = Some(v);
        }
        if let Some(v) = patch.service_booking_cost {
            self.service_booking_cost = Some(v);
        }
        if let Some(v) = patch.service_name {
            self.service_name = Some(v);
        }
        if let Some(v) = patch.add_more_info {
            self.add_more_info = Some(v);
        }
        if let Some(v) = patch.source_of_lead {
            self.source_of_lead = Some(v);
        }
        if let Some(v) = patch.user_location {
            self.user_location = Some(v);
        }
    }
}

/// Partial update contributed by one page of the flow (selected service,
/// picked slot, chosen address). Same shape as [`BookingState`], all fields
/// optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPatch {
    pub service_id: Option<String>,
    pub provider_id: Option<String>,
    pub booked_date: Option<String>,
    pub booked_time: Option<String>,
    pub service_address_id: Option<String>,
    pub service_booking_cost: Option<f64>,
    pub service_name: Option<String>,
    pub add_more_info: Option<String>,
    pub source_of_lead: Option<String>,
    pub user_location: Option<UserLocation>,
}

/// Final object handed to the booking-creation endpoint. `provider_id` is
/// present only for service-center bookings; the endpoint rejects a stray
/// `providerId` on a direct booking, so the key must be absent rather than
/// null.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub reference_id: String,
    pub service_id: String,
    pub service_address_id: String,
    pub booked_date: String,
    pub booked_time: String,
    pub source_of_lead: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_booking_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_more_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
}
