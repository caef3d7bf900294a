//! Twitter/X v1.1 posting client.
//!
//! Wraps the shared HTTP client with OAuth 1.0a signing and the three
//! operations the bot consumes: credential verification, "post image with
//! caption", and "post text as a reply". The publisher depends on the
//! [`StatusPoster`] trait so tests can substitute a recording stub.
use crate::twitter::oauth::OauthKeys;
use crate::twitter::types::{MediaUploadResponse, TweetResponse, VerifyResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use perch_http::header::{AUTHORIZATION, HeaderValue};
use perch_http::{Auth, HttpClient, RequestOpts};
use std::path::Path;

const API_BASE: &str = "https://api.twitter.com";
const UPLOAD_BASE: &str = "https://upload.twitter.com";

const VERIFY_PATH: &str = "1.1/account/verify_credentials.json";
const UPDATE_PATH: &str = "1.1/statuses/update.json";
const MEDIA_UPLOAD_PATH: &str = "1.1/media/upload.json";

/// Identifier of a successfully published status, used to anchor replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedUpdate {
    pub id: String,
}

/// The posting-service operations the publisher consumes.
#[async_trait]
pub trait StatusPoster: Send + Sync {
    /// Ask the service whether the configured credentials are valid.
    async fn verify_credentials(&self) -> Result<()>;

    /// Publish the image at `image` with `caption` as the status text.
    async fn post_image(&self, image: &Path, caption: &str) -> Result<PostedUpdate>;

    /// Publish `text` as a threaded reply to `update`.
    async fn post_reply(&self, text: &str, update: &PostedUpdate) -> Result<()>;
}

#[derive(Clone)]
pub struct TwitterApi {
    api: HttpClient,
    upload: HttpClient,
    keys: OauthKeys,
}

impl TwitterApi {
    pub fn new(keys: OauthKeys) -> Self {
        let api = HttpClient::new(API_BASE).expect("twitter base url");
        let upload = HttpClient::new(UPLOAD_BASE).expect("twitter upload base url");
        Self { api, upload, keys }
    }

    /// Sign one request; `params` must list every form/query parameter.
    fn signed(&self, method: &str, url: &str, params: &[(&str, &str)]) -> Result<Auth> {
        let value = self.keys.authorization_header(method, url, params);
        let value =
            HeaderValue::from_str(&value).context("OAuth header contains invalid characters")?;
        Ok(Auth::Header {
            name: AUTHORIZATION,
            value,
        })
    }

    async fn update_status(&self, params: &[(&str, &str)]) -> Result<TweetResponse> {
        let url = format!("{API_BASE}/{UPDATE_PATH}");
        let auth = self.signed("POST", &url, params)?;
        let tweet: TweetResponse = self
            .api
            .post_form(
                UPDATE_PATH,
                params,
                RequestOpts {
                    auth: Some(auth),
                    ..Default::default()
                },
            )
            .await?;
        Ok(tweet)
    }
}

#[async_trait]
impl StatusPoster for TwitterApi {
    async fn verify_credentials(&self) -> Result<()> {
        let url = format!("{API_BASE}/{VERIFY_PATH}");
        let auth = self.signed("GET", &url, &[])?;
        let who: VerifyResponse = self
            .api
            .get_json(
                VERIFY_PATH,
                RequestOpts {
                    auth: Some(auth),
                    ..Default::default()
                },
            )
            .await?;
        tracing::debug!(screen_name = %who.screen_name, "twitter.credentials_verified");
        Ok(())
    }

    async fn post_image(&self, image: &Path, caption: &str) -> Result<PostedUpdate> {
        let bytes = std::fs::read(image)
            .with_context(|| format!("failed to read image file {}", image.display()))?;
        let media_data = BASE64.encode(&bytes);

        let upload_params: [(&str, &str); 1] = [("media_data", &media_data)];
        let url = format!("{UPLOAD_BASE}/{MEDIA_UPLOAD_PATH}");
        let auth = self.signed("POST", &url, &upload_params)?;
        let media: MediaUploadResponse = self
            .upload
            .post_form(
                MEDIA_UPLOAD_PATH,
                &upload_params,
                RequestOpts {
                    auth: Some(auth),
                    ..Default::default()
                },
            )
            .await?;
        tracing::debug!(media_id = %media.media_id_string, "twitter.media_uploaded");

        let tweet = self
            .update_status(&[
                ("status", caption),
                ("media_ids", media.media_id_string.as_str()),
            ])
            .await?;
        Ok(PostedUpdate { id: tweet.id_str })
    }

    async fn post_reply(&self, text: &str, update: &PostedUpdate) -> Result<()> {
        let tweet = self
            .update_status(&[
                ("status", text),
                ("in_reply_to_status_id", update.id.as_str()),
            ])
            .await?;
        tracing::debug!(reply_id = %tweet.id_str, parent_id = %update.id, "twitter.reply_posted");
        Ok(())
    }
}
