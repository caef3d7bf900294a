use serde::{Deserialize, Serialize};

/// `GET account/verify_credentials` — only the fields we log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub id_str: String,
    pub screen_name: String,
}

/// `POST media/upload` (base64 `media_data` flavor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaUploadResponse {
    pub media_id_string: String,
    #[serde(default)]
    pub expires_after_secs: Option<u64>,
}

/// `POST statuses/update` — the posted tweet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetResponse {
    pub id_str: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub in_reply_to_status_id_str: Option<String>,
}
