use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileViewsResponse {
    pub username: String,
    pub views: u64,
    pub incremented: bool,
}
