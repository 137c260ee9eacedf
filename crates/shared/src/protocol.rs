use serde::{Deserialize, Serialize};

use crate::domain::{Wine, WineListId, WineServerId};

/// `GET /wine_list/{id}` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WineListResponse {
    #[serde(default)]
    pub wines: Vec<Wine>,
}

/// Request paths relative to the API base URL.
pub mod paths {
    use super::*;

    pub fn wine_list(list_id: WineListId) -> String {
        format!("/wine_list/{}", list_id.0)
    }

    pub fn create_wine(list_id: WineListId) -> String {
        format!("/create_wine/{}", list_id.0)
    }

    pub const UPDATE_WINES: &str = "/update_wines";

    pub fn delete_wine(wine_id: WineServerId) -> String {
        format!("/delete_wine/{}", wine_id.0)
    }
}
