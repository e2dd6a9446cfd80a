use serde::{Deserialize, Serialize};

// Request payload for link code issuance.
#[derive(Debug, Deserialize)]
pub struct GenerateLinkCodeRequest {
    #[serde(rename = "playFabId", default)]
    pub play_fab_id: Option<String>,
}

// Response payload for link code issuance.
#[derive(Debug, Serialize)]
pub struct GenerateLinkCodeResponse {
    pub code: String,
}

// Error envelope shared by every JSON error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
