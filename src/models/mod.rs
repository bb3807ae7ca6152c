pub mod address;
pub mod booking;

pub use address::AddressRecord;
pub use booking::{BookingFlow, BookingPatch, BookingState, SubmissionPayload, UserLocation};
