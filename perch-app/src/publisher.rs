//! One full run: verify credentials, pick a bird, post image then reply.
//!
//! The two posting stages are independent failure zones. An image-stage
//! failure skips the text stage entirely; a text-stage failure leaves the
//! already-published image post standing. Neither escapes [`Publisher::publish`] —
//! the outcome records what actually went out, and the log carries the why.

use crate::dataset::SourceDataset;
use crate::trim::{MAX_STATUS_CHARS, char_len, trim_status};
use anyhow::Context;
use perch_common::PublishError;
use perch_social::{PostedUpdate, StatusPoster};
use perch_web::{PageSource, guide_description, guide_image_url};
use std::path::{Path, PathBuf};

/// What one run actually published.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// The image post, if stage A succeeded.
    pub posted: Option<PostedUpdate>,
    /// Whether the threaded reply went out as well.
    pub reply_sent: bool,
}

pub struct Publisher<P, S> {
    poster: P,
    pages: S,
    dataset: SourceDataset,
    scratch_path: PathBuf,
    auth_failure_fatal: bool,
}

impl<P: StatusPoster, S: PageSource> Publisher<P, S> {
    pub fn new(poster: P, pages: S, dataset: SourceDataset, scratch_path: PathBuf) -> Self {
        Self {
            poster,
            pages,
            dataset,
            scratch_path,
            auth_failure_fatal: false,
        }
    }

    /// Treat a failed credential check as fatal instead of advisory.
    pub fn with_auth_failure_fatal(mut self, fatal: bool) -> Self {
        self.auth_failure_fatal = fatal;
        self
    }

    /// One full run: authenticate, select, publish.
    pub async fn run(&self) -> perch_common::Result<RunOutcome> {
        match self.poster.verify_credentials().await {
            Ok(()) => tracing::info!("credentials verified"),
            Err(source) => {
                let err = PublishError::Credential(source);
                tracing::error!(kind = err.kind(), error = ?err, "credential check failed");
                if self.auth_failure_fatal {
                    return Err(err);
                }
            }
        }

        tracing::info!("picking a random bird");
        let url = self.dataset.pick_random();
        tracing::info!(bird = url_stem(url), %url, "picked");

        Ok(self.publish(url).await)
    }

    /// Publish one page: image stage, then text stage.
    ///
    /// Never returns an error; each stage failure is logged at its boundary
    /// and reflected in the outcome.
    pub async fn publish(&self, url: &str) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        let html = match self.pages.fetch_html(url).await {
            Ok(html) => html,
            Err(source) => {
                let err = PublishError::ImageStage {
                    url: url.to_string(),
                    source,
                };
                tracing::error!(kind = err.kind(), error = ?err, "problem with bird image");
                return outcome;
            }
        };

        let update = match self.image_stage(url, &html).await {
            Ok(update) => {
                tracing::info!(bird = url_stem(url), id = %update.id, "image sent");
                update
            }
            Err(err) => {
                tracing::error!(kind = err.kind(), error = ?err, "problem with bird image");
                return outcome;
            }
        };
        outcome.posted = Some(update.clone());

        match self.text_stage(url, &html, &update).await {
            Ok(()) => {
                tracing::info!(bird = url_stem(url), "text sent");
                outcome.reply_sent = true;
            }
            Err(err) => {
                tracing::error!(kind = err.kind(), error = ?err, "problem with bird text");
            }
        }

        outcome
    }

    /// Stage A: extract the image, download it, post it with the page URL
    /// as the caption. The scratch file is removed on every exit path.
    async fn image_stage(&self, url: &str, html: &str) -> Result<PostedUpdate, PublishError> {
        let wrap = |source: anyhow::Error| PublishError::ImageStage {
            url: url.to_string(),
            source,
        };

        let image_url = guide_image_url(html).map_err(|e| wrap(e.into()))?;
        tracing::debug!(%image_url, "found guide image");

        let bytes = self.pages.fetch_bytes(&image_url).await.map_err(wrap)?;
        let scratch = ScratchFile::write(&self.scratch_path, &bytes).map_err(wrap)?;
        let update = self
            .poster
            .post_image(scratch.path(), url)
            .await
            .map_err(wrap)?;
        // `scratch` drops here, deleting the file whether the post above
        // succeeded or not.
        Ok(update)
    }

    /// Stage B: extract the description, shorten it if needed, post it as a
    /// threaded reply to the image update.
    async fn text_stage(
        &self,
        url: &str,
        html: &str,
        update: &PostedUpdate,
    ) -> Result<(), PublishError> {
        let wrap = |source: anyhow::Error| PublishError::TextStage {
            url: url.to_string(),
            source,
        };

        let text = guide_description(html).map_err(|e| wrap(e.into()))?;
        let text = if char_len(&text) > MAX_STATUS_CHARS {
            trim_status(&text)
        } else {
            text
        };

        self.poster.post_reply(&text, update).await.map_err(wrap)?;
        Ok(())
    }
}

/// Transient image file with deletion guaranteed by `Drop`, covering
/// success, stage failure, and early returns alike.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// The guard is created before the write so a partially written file is
    /// cleaned up when the write itself fails.
    fn write(path: &Path, bytes: &[u8]) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let guard = Self {
            path: path.to_path_buf(),
        };
        std::fs::write(&guard.path, bytes)
            .with_context(|| format!("failed to write image to {}", guard.path.display()))?;
        Ok(guard)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %err, "failed to remove scratch image");
            }
        }
    }
}

/// Last path segment without its extension, for compact log lines.
fn url_stem(url: &str) -> &str {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const PAGE_URL: &str = "http://example.test/finch";
    const IMAGE_URL: &str = "http://example.test/finch.jpg";

    fn page(description: &str) -> String {
        format!(
            r#"<html><body>
              <div class="bird-guide-image"><img src="{IMAGE_URL}"></div>
              <div class="hide-for-tiny hide-for-small hide-for-medium">{description}</div>
            </body></html>"#
        )
    }

    fn page_without_image(description: &str) -> String {
        format!(
            r#"<html><body>
              <div class="hide-for-tiny hide-for-small hide-for-medium">{description}</div>
            </body></html>"#
        )
    }

    fn page_without_description() -> String {
        format!(r#"<html><body><div class="bird-guide-image"><img src="{IMAGE_URL}"></div></body></html>"#)
    }

    #[derive(Default)]
    struct SpyPoster {
        fail_verify: bool,
        fail_image_post: bool,
        fail_reply_post: bool,
        // (caption, scratch file existed at post time)
        image_posts: Mutex<Vec<(String, bool)>>,
        // (text, parent id)
        replies: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl StatusPoster for SpyPoster {
        async fn verify_credentials(&self) -> anyhow::Result<()> {
            if self.fail_verify {
                anyhow::bail!("bad credentials");
            }
            Ok(())
        }

        async fn post_image(&self, image: &Path, caption: &str) -> anyhow::Result<PostedUpdate> {
            self.image_posts
                .lock()
                .unwrap()
                .push((caption.to_string(), image.exists()));
            if self.fail_image_post {
                anyhow::bail!("image post rejected");
            }
            Ok(PostedUpdate { id: "111".into() })
        }

        async fn post_reply(&self, text: &str, update: &PostedUpdate) -> anyhow::Result<()> {
            self.replies
                .lock()
                .unwrap()
                .push((text.to_string(), update.id.clone()));
            if self.fail_reply_post {
                anyhow::bail!("reply rejected");
            }
            Ok(())
        }
    }

    struct StubPages {
        html: String,
    }

    #[async_trait]
    impl PageSource for StubPages {
        async fn fetch_html(&self, _url: &str) -> anyhow::Result<String> {
            Ok(self.html.clone())
        }

        async fn fetch_bytes(&self, _url: &str) -> anyhow::Result<Vec<u8>> {
            Ok(vec![0xFF, 0xD8, 0xFF])
        }
    }

    struct Fixture {
        tmp: TempDir,
        publisher: Publisher<SpyPoster, StubPages>,
    }

    impl Fixture {
        fn new(poster: SpyPoster, html: String) -> Self {
            Self::with_fatal_auth(poster, html, false)
        }

        fn with_fatal_auth(poster: SpyPoster, html: String, fatal: bool) -> Self {
            let tmp = TempDir::new().unwrap();
            let dataset = SourceDataset::parse(&format!("BIRD URLs\n{PAGE_URL}\n")).unwrap();
            let scratch = tmp.path().join("bird.jpg");
            let publisher = Publisher::new(poster, StubPages { html }, dataset, scratch)
                .with_auth_failure_fatal(fatal);
            Self { tmp, publisher }
        }

        fn scratch_exists(&self) -> bool {
            self.tmp.path().join("bird.jpg").exists()
        }
    }

    #[tokio::test]
    async fn end_to_end_posts_image_then_reply() {
        let description = "a".repeat(50);
        let fx = Fixture::new(SpyPoster::default(), page(&description));

        let outcome = fx.publisher.run().await.unwrap();

        assert_eq!(outcome.posted.as_ref().map(|u| u.id.as_str()), Some("111"));
        assert!(outcome.reply_sent);

        let images = fx.publisher.poster.image_posts.lock().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].0, PAGE_URL);
        assert!(images[0].1, "scratch file must exist while posting");

        let replies = fx.publisher.poster.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, description, "50-char text posted untrimmed");
        assert_eq!(replies[0].1, "111");

        assert!(!fx.scratch_exists(), "scratch file removed after the run");
    }

    #[tokio::test]
    async fn missing_image_region_skips_text_stage() {
        let fx = Fixture::new(SpyPoster::default(), page_without_image("some text"));

        let outcome = fx.publisher.publish(PAGE_URL).await;

        assert!(outcome.posted.is_none());
        assert!(!outcome.reply_sent);
        assert!(fx.publisher.poster.image_posts.lock().unwrap().is_empty());
        assert!(fx.publisher.poster.replies.lock().unwrap().is_empty());
        assert!(!fx.scratch_exists());
    }

    #[tokio::test]
    async fn missing_description_keeps_image_post() {
        let fx = Fixture::new(SpyPoster::default(), page_without_description());

        let outcome = fx.publisher.publish(PAGE_URL).await;

        assert!(outcome.posted.is_some());
        assert!(!outcome.reply_sent);
        assert_eq!(fx.publisher.poster.image_posts.lock().unwrap().len(), 1);
        assert!(fx.publisher.poster.replies.lock().unwrap().is_empty());
        assert!(!fx.scratch_exists());
    }

    #[tokio::test]
    async fn failed_image_post_cleans_scratch_and_skips_reply() {
        let poster = SpyPoster {
            fail_image_post: true,
            ..Default::default()
        };
        let fx = Fixture::new(poster, page("text"));

        let outcome = fx.publisher.publish(PAGE_URL).await;

        assert!(outcome.posted.is_none());
        assert!(fx.publisher.poster.replies.lock().unwrap().is_empty());
        assert!(!fx.scratch_exists(), "scratch removed on image-stage failure");
    }

    #[tokio::test]
    async fn failed_reply_still_reports_image_post() {
        let poster = SpyPoster {
            fail_reply_post: true,
            ..Default::default()
        };
        let fx = Fixture::new(poster, page("text"));

        let outcome = fx.publisher.publish(PAGE_URL).await;

        assert!(outcome.posted.is_some());
        assert!(!outcome.reply_sent);
        assert!(!fx.scratch_exists());
    }

    #[tokio::test]
    async fn long_description_is_trimmed_to_whole_sentences() {
        let description = format!("A bird is here. It eats seeds. {}.", "x".repeat(300));
        let fx = Fixture::new(SpyPoster::default(), page(&description));

        fx.publisher.publish(PAGE_URL).await;

        let replies = fx.publisher.poster.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "A bird is here. It eats seeds.");
    }

    #[tokio::test]
    async fn auth_failure_is_advisory_by_default() {
        let poster = SpyPoster {
            fail_verify: true,
            ..Default::default()
        };
        let fx = Fixture::new(poster, page("text"));

        let outcome = fx.publisher.run().await.unwrap();
        assert!(outcome.posted.is_some(), "run continues past failed check");
    }

    #[tokio::test]
    async fn auth_failure_aborts_when_configured_fatal() {
        let poster = SpyPoster {
            fail_verify: true,
            ..Default::default()
        };
        let fx = Fixture::with_fatal_auth(poster, page("text"), true);

        let err = fx.publisher.run().await.unwrap_err();
        assert_eq!(err.kind(), "credential");
        assert!(fx.publisher.poster.image_posts.lock().unwrap().is_empty());
    }

    #[test]
    fn url_stem_strips_path_and_extension() {
        assert_eq!(url_stem("http://example.test/guide/House_Finch"), "House_Finch");
        assert_eq!(url_stem("http://example.test/finch.jpg"), "finch");
        assert_eq!(url_stem("http://example.test/guide/"), "guide");
    }
}
