use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::clients::{AddressApi, BookingApi};
use crate::services::store::BookingStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub booking_api: Box<dyn BookingApi>,
    pub address_api: Box<dyn AddressApi>,
    pub store: BookingStore,
}
