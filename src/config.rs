use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub booking_api_url: String,
    pub address_api_url: String,
    pub source_of_lead: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "repairmart.db".to_string()),
            booking_api_url: env::var("BOOKING_API_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            address_api_url: env::var("ADDRESS_API_URL")
                .unwrap_or_else(|_| "http://localhost:8082".to_string()),
            source_of_lead: env::var("SOURCE_OF_LEAD")
                .unwrap_or_else(|_| "repairmart_web".to_string()),
        }
    }
}
