use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::errors::AppError;
use crate::models::{BookingFlow, BookingState, SubmissionPayload};
use crate::services::clients::BookingReceipt;
use crate::services::persistence;
use crate::services::store::EventKind;
use crate::state::AppState;

/// Checks a date/time pair before it is merged into the booking. The two
/// are only meaningful together, so both must parse: `YYYY-MM-DD` and
/// 12-hour `hh:mm AM/PM`.
pub fn validate_schedule(date: &str, time: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidSchedule(format!("bad date {date:?}, expected YYYY-MM-DD")))?;
    NaiveTime::parse_from_str(time, "%I:%M %p")
        .map_err(|_| AppError::InvalidSchedule(format!("bad time {time:?}, expected hh:mm AM/PM")))?;
    Ok(())
}

fn required(value: &Option<String>, missing: AppError) -> Result<String, AppError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(missing),
    }
}

/// Assembles the object sent to the booking-creation endpoint. Rejects with
/// an actionable error when a required field is still missing; includes
/// `provider_id` only for service-center bookings.
pub fn build_submission_payload(
    state: &BookingState,
    default_source: &str,
) -> Result<SubmissionPayload, AppError> {
    let service_id = required(&state.service_id, AppError::MissingService)?;
    let booked_date = required(&state.booked_date, AppError::MissingSchedule)?;
    let booked_time = required(&state.booked_time, AppError::MissingSchedule)?;
    let service_address_id = required(&state.service_address_id, AppError::MissingAddress)?;

    let provider_id = match state.flow() {
        BookingFlow::ServiceCenter(id) => Some(id),
        BookingFlow::Direct => None,
    };

    Ok(SubmissionPayload {
        reference_id: uuid::Uuid::new_v4().to_string(),
        service_id,
        service_address_id,
        booked_date,
        booked_time,
        source_of_lead: state
            .source_of_lead
            .clone()
            .unwrap_or_else(|| default_source.to_string()),
        provider_id,
        service_name: state.service_name.clone(),
        service_booking_cost: state.service_booking_cost,
        add_more_info: state.add_more_info.clone(),
        user_location: state.user_location.clone(),
    })
}

/// Terminal reconciliation: load the durable state, assemble the payload,
/// persist once more, hand off to the booking collaborator, and clear the
/// session on success so the next booking starts clean.
pub async fn submit_booking(
    app: &Arc<AppState>,
    session_id: &str,
) -> Result<BookingReceipt, AppError> {
    let payload = {
        let db = app.db.lock().unwrap();
        let state = persistence::load(&db, session_id);
        let payload = build_submission_payload(&state, &app.config.source_of_lead)?;
        persistence::save(&db, session_id, &state)?;
        payload
    };

    let receipt = app
        .booking_api
        .create_booking(&payload)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    tracing::info!(
        session_id,
        booking_id = %receipt.booking_id,
        provider = payload.provider_id.as_deref().unwrap_or("direct"),
        "booking submitted"
    );

    {
        let db = app.db.lock().unwrap();
        persistence::clear(&db, session_id)?;
    }
    app.store.clear(session_id, EventKind::Submitted);

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingPatch;

    fn ready_state() -> BookingState {
        let mut state = BookingState::default();
        state.apply(BookingPatch {
            service_id: Some("S1".to_string()),
            ..Default::default()
        });
        state.apply(BookingPatch {
            booked_date: Some("2024-06-01".to_string()),
            booked_time: Some("10:00 AM".to_string()),
            ..Default::default()
        });
        state.apply(BookingPatch {
            service_address_id: Some("A1".to_string()),
            ..Default::default()
        });
        state
    }

    #[test]
    fn test_direct_flow_payload_has_no_provider_key() {
        let payload = build_submission_payload(&ready_state(), "storefront").unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("providerId").is_none(), "{json}");
        assert_eq!(json["serviceId"], "S1");
        assert_eq!(json["bookedDate"], "2024-06-01");
        assert_eq!(json["bookedTime"], "10:00 AM");
        assert_eq!(json["serviceAddressId"], "A1");
        assert_eq!(json["sourceOfLead"], "storefront");
    }

    #[test]
    fn test_provider_flow_payload_includes_provider() {
        let mut state = ready_state();
        state.provider_id = Some("P1".to_string());

        let payload = build_submission_payload(&state, "storefront").unwrap();
        assert_eq!(payload.provider_id.as_deref(), Some("P1"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["providerId"], "P1");
    }

    #[test]
    fn test_null_string_provider_is_not_transmitted() {
        let mut state = ready_state();
        state.provider_id = Some("null".to_string());

        let payload = build_submission_payload(&state, "storefront").unwrap();
        assert!(payload.provider_id.is_none());
    }

    #[test]
    fn test_rejects_missing_required_fields() {
        let mut no_service = ready_state();
        no_service.service_id = None;
        assert!(matches!(
            build_submission_payload(&no_service, "storefront"),
            Err(AppError::MissingService)
        ));

        let mut no_date = ready_state();
        no_date.booked_date = None;
        assert!(matches!(
            build_submission_payload(&no_date, "storefront"),
            Err(AppError::MissingSchedule)
        ));

        let mut empty_time = ready_state();
        empty_time.booked_time = Some("  ".to_string());
        assert!(matches!(
            build_submission_payload(&empty_time, "storefront"),
            Err(AppError::MissingSchedule)
        ));

        let mut no_address = ready_state();
        no_address.service_address_id = Some(String::new());
        assert!(matches!(
            build_submission_payload(&no_address, "storefront"),
            Err(AppError::MissingAddress)
        ));
    }

    #[test]
    fn test_source_of_lead_defaults_when_unset() {
        let payload = build_submission_payload(&ready_state(), "repairmart_web").unwrap();
        assert_eq!(payload.source_of_lead, "repairmart_web");

        let mut tagged = ready_state();
        tagged.source_of_lead = Some("partner_app".to_string());
        let payload = build_submission_payload(&tagged, "repairmart_web").unwrap();
        assert_eq!(payload.source_of_lead, "partner_app");
    }

    #[test]
    fn test_validate_schedule_formats() {
        assert!(validate_schedule("2024-06-01", "10:00 AM").is_ok());
        assert!(validate_schedule("2024-12-31", "09:30 PM").is_ok());
        assert!(validate_schedule("01-06-2024", "10:00 AM").is_err());
        assert!(validate_schedule("2024-06-01", "22:00").is_err());
        assert!(validate_schedule("2024-06-01", "10 AM").is_err());
    }
}
