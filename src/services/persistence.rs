//! Bridges the in-memory booking store to durable client storage and applies
//! the flow-exclusion rule on every write.
//!
//! Two keys are kept mirror-consistent: the canonical `bookingContext` and
//! the legacy `currentBooking` that pre-dates it. A session that only has
//! the legacy key is migrated on first load.
//!
//! Known limitation: two clients writing under the same session id race with
//! last-write-wins semantics. There is no versioning or cross-client
//! notification; see DESIGN.md.

use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingFlow, BookingState};

pub const BOOKING_CONTEXT_KEY: &str = "bookingContext";
pub const LEGACY_BOOKING_KEY: &str = "currentBooking";

fn decode(raw: &str, key: &str) -> Option<BookingState> {
    match serde_json::from_str(raw) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(key, error = %e, "corrupt booking state in storage, treating as absent");
            None
        }
    }
}

/// Serializes `state` for storage or submission. The persisted object
/// carries the `providerId` key iff the flow is service-center: a direct
/// booking must have the key absent — not null — because the booking
/// endpoint distinguishes the two and only accepts the former.
pub fn encode(state: &BookingState) -> Result<String, AppError> {
    let mut value = serde_json::to_value(state)
        .map_err(|e| AppError::StorageWrite(format!("failed to serialize booking state: {e}")))?;

    if let BookingFlow::Direct = state.flow() {
        if let Some(obj) = value.as_object_mut() {
            obj.remove("providerId");
        }
    }

    Ok(value.to_string())
}

/// Loads the booking state for a session: canonical key first, then the
/// legacy key (migrating it to the canonical key on the way), else the
/// empty default. Never fails — corrupt JSON and read errors degrade to
/// "absent" with a log line.
pub fn load(conn: &Connection, session_id: &str) -> BookingState {
    match queries::get_item(conn, session_id, BOOKING_CONTEXT_KEY) {
        Ok(Some(raw)) => {
            if let Some(state) = decode(&raw, BOOKING_CONTEXT_KEY) {
                return state;
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "failed to read booking context, treating as absent");
        }
    }

    match queries::get_item(conn, session_id, LEGACY_BOOKING_KEY) {
        Ok(Some(raw)) => {
            if let Some(state) = decode(&raw, LEGACY_BOOKING_KEY) {
                migrate_legacy(conn, session_id, &state);
                return state;
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "failed to read legacy booking key, treating as absent");
        }
    }

    BookingState::default()
}

/// One-time copy of the legacy value under the canonical key. Idempotent:
/// re-running it writes the same content. A failed write is only logged —
/// the next load retries the migration.
fn migrate_legacy(conn: &Connection, session_id: &str, state: &BookingState) {
    let encoded = match encode(state) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode legacy booking state for migration");
            return;
        }
    };
    match queries::set_item(conn, session_id, BOOKING_CONTEXT_KEY, &encoded) {
        Ok(()) => tracing::info!(session_id, "migrated legacy booking key to canonical key"),
        Err(e) => tracing::warn!(error = %e, "failed to migrate legacy booking key"),
    }
}

/// Persists `state` under both keys, with the flow-exclusion rule applied.
pub fn save(conn: &Connection, session_id: &str, state: &BookingState) -> Result<(), AppError> {
    let encoded = encode(state)?;

    queries::set_item(conn, session_id, BOOKING_CONTEXT_KEY, &encoded)
        .map_err(|e| AppError::StorageWrite(e.to_string()))?;
    queries::set_item(conn, session_id, LEGACY_BOOKING_KEY, &encoded)
        .map_err(|e| AppError::StorageWrite(e.to_string()))?;

    Ok(())
}

/// Forces the session into the direct-service flow: any previously browsed
/// provider is dropped so it cannot leak into a direct booking.
pub fn set_service_flow(conn: &Connection, session_id: &str) -> Result<BookingState, AppError> {
    let mut state = load(conn, session_id);
    state.provider_id = None;
    save(conn, session_id, &state)?;
    Ok(state)
}

/// Forces the session into the service-center flow for `provider_id`.
pub fn set_provider_flow(
    conn: &Connection,
    session_id: &str,
    provider_id: &str,
) -> Result<BookingState, AppError> {
    let mut state = load(conn, session_id);
    state.provider_id = Some(provider_id.to_string());
    save(conn, session_id, &state)?;
    Ok(state)
}

/// Removes both keys. Called after a successful submission so a new booking
/// starts from a clean slate instead of inheriting stale fields.
pub fn clear(conn: &Connection, session_id: &str) -> Result<(), AppError> {
    queries::remove_item(conn, session_id, BOOKING_CONTEXT_KEY)
        .map_err(|e| AppError::StorageWrite(e.to_string()))?;
    queries::remove_item(conn, session_id, LEGACY_BOOKING_KEY)
        .map_err(|e| AppError::StorageWrite(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::UserLocation;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn full_state(provider_id: Option<&str>) -> BookingState {
        BookingState {
            service_id: Some("S1".to_string()),
            provider_id: provider_id.map(str::to_string),
            booked_date: Some("2024-06-01".to_string()),
            booked_time: Some("10:00 AM".to_string()),
            service_address_id: Some("A1".to_string()),
            service_booking_cost: Some(499.0),
            service_name: Some("Washing machine repair".to_string()),
            add_more_info: Some("Drum makes a grinding noise".to_string()),
            source_of_lead: Some("storefront".to_string()),
            user_location: Some(UserLocation {
                latitude: 12.97,
                longitude: 77.59,
                address: Some("Bengaluru".to_string()),
            }),
        }
    }

    fn persisted_json(conn: &Connection, key: &str) -> serde_json::Value {
        let raw = queries::get_item(conn, "s1", key).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_save_includes_provider_for_service_center_flow() {
        let conn = setup_db();
        save(&conn, "s1", &full_state(Some("P1"))).unwrap();

        for key in [BOOKING_CONTEXT_KEY, LEGACY_BOOKING_KEY] {
            let json = persisted_json(&conn, key);
            assert_eq!(json["providerId"], "P1", "key={key}");
        }
    }

    #[test]
    fn test_save_omits_provider_key_for_direct_flow() {
        let conn = setup_db();
        for bad in [None, Some("null"), Some(""), Some("   ")] {
            save(&conn, "s1", &full_state(bad)).unwrap();
            let json = persisted_json(&conn, BOOKING_CONTEXT_KEY);
            assert!(
                json.get("providerId").is_none(),
                "providerId leaked for {bad:?}: {json}"
            );
        }
    }

    #[test]
    fn test_roundtrip_preserves_all_other_fields() {
        let conn = setup_db();
        let state = full_state(Some("null"));
        save(&conn, "s1", &state).unwrap();

        let loaded = load(&conn, "s1");
        assert_eq!(loaded.provider_id, None); // suppressed by flow exclusion
        assert_eq!(loaded.service_id, state.service_id);
        assert_eq!(loaded.booked_date, state.booked_date);
        assert_eq!(loaded.booked_time, state.booked_time);
        assert_eq!(loaded.service_address_id, state.service_address_id);
        assert_eq!(loaded.service_booking_cost, state.service_booking_cost);
        assert_eq!(loaded.service_name, state.service_name);
        assert_eq!(loaded.add_more_info, state.add_more_info);
        assert_eq!(loaded.source_of_lead, state.source_of_lead);
        assert_eq!(loaded.user_location, state.user_location);
    }

    #[test]
    fn test_load_migrates_legacy_key_once_and_idempotently() {
        let conn = setup_db();
        let legacy = encode(&full_state(Some("P1"))).unwrap();
        queries::set_item(&conn, "s1", LEGACY_BOOKING_KEY, &legacy).unwrap();

        let first = load(&conn, "s1");
        assert_eq!(first.provider_id.as_deref(), Some("P1"));

        // Canonical key now exists and holds the legacy content
        let canonical = persisted_json(&conn, BOOKING_CONTEXT_KEY);
        assert_eq!(canonical, serde_json::from_str::<serde_json::Value>(&legacy).unwrap());

        // Second load returns the same state
        let second = load(&conn, "s1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_canonical_key_takes_precedence_over_legacy() {
        let conn = setup_db();
        queries::set_item(&conn, "s1", LEGACY_BOOKING_KEY, r#"{"serviceId":"OLD"}"#).unwrap();
        queries::set_item(&conn, "s1", BOOKING_CONTEXT_KEY, r#"{"serviceId":"NEW"}"#).unwrap();

        assert_eq!(load(&conn, "s1").service_id.as_deref(), Some("NEW"));
    }

    #[test]
    fn test_corrupt_canonical_falls_back_to_legacy_then_default() {
        let conn = setup_db();
        queries::set_item(&conn, "s1", BOOKING_CONTEXT_KEY, "{not json").unwrap();
        queries::set_item(&conn, "s1", LEGACY_BOOKING_KEY, r#"{"serviceId":"S9"}"#).unwrap();
        assert_eq!(load(&conn, "s1").service_id.as_deref(), Some("S9"));

        queries::set_item(&conn, "s2", BOOKING_CONTEXT_KEY, "{not json").unwrap();
        queries::set_item(&conn, "s2", LEGACY_BOOKING_KEY, "also not json").unwrap();
        assert_eq!(load(&conn, "s2"), BookingState::default());
    }

    #[test]
    fn test_load_on_empty_storage_returns_default() {
        let conn = setup_db();
        assert_eq!(load(&conn, "fresh"), BookingState::default());
    }

    #[test]
    fn test_flow_switch_drops_provider_across_reload() {
        let conn = setup_db();
        save(&conn, "s1", &full_state(Some("P1"))).unwrap();

        set_service_flow(&conn, "s1").unwrap();

        let reloaded = load(&conn, "s1");
        assert!(reloaded.provider_id.is_none());
        // Everything else survives the switch
        assert_eq!(reloaded.service_id.as_deref(), Some("S1"));
        let json = persisted_json(&conn, BOOKING_CONTEXT_KEY);
        assert!(json.get("providerId").is_none());
    }

    #[test]
    fn test_set_provider_flow_persists_provider() {
        let conn = setup_db();
        save(&conn, "s1", &full_state(None)).unwrap();

        let state = set_provider_flow(&conn, "s1", "P7").unwrap();
        assert_eq!(state.provider_id.as_deref(), Some("P7"));
        assert_eq!(persisted_json(&conn, BOOKING_CONTEXT_KEY)["providerId"], "P7");
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let conn = setup_db();
        save(&conn, "s1", &full_state(Some("P1"))).unwrap();

        clear(&conn, "s1").unwrap();

        assert!(queries::get_item(&conn, "s1", BOOKING_CONTEXT_KEY).unwrap().is_none());
        assert!(queries::get_item(&conn, "s1", LEGACY_BOOKING_KEY).unwrap().is_none());
        assert_eq!(load(&conn, "s1"), BookingState::default());
    }
}
