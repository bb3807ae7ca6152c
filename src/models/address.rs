use serde::{Deserialize, Serialize};

/// Saved address record as the address service returns it. The booking core
/// only ever uses `_id` (as the opaque `serviceAddressId`); the rest is
/// passed through for the address picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub address_type: Option<String>,
    pub name: Option<String>,
    pub flat: Option<String>,
    pub area: Option<String>,
    pub address_line_one: Option<String>,
    pub address_line_two: Option<String>,
    pub city_name: Option<String>,
    pub state_name: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub default_address: bool,
}
