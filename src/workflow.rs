// Workflow stages: discover tools, submit a retrieval, poll it to the end
// and download the page data. Each stage returns its own result type so
// the caller decides what is fatal; nothing here prompts or prints.

use log::{error, info, warn};
use uuid::Uuid;

use crate::api::{
    ApiClient, ContentInfo, Mode, RetrievalRequest, RetrievalSubmission, Tool,
};
use crate::error::ApiError;
use crate::poll::{poll_until_done, PollConfig, PollEvent, PollOutcome, Sleeper, TokioSleeper};
use crate::preview::render_preview;

pub const DEFAULT_TARGET_URL: &str = "https://example.com";

/// What to retrieve and how. Built from prompts in the CLI, but any
/// source will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalParams {
    pub url: String,
    pub force_refresh: bool,
    pub mode: Mode,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            force_refresh: false,
            mode: Mode::Private,
        }
    }
}

impl RetrievalParams {
    /// Interpret raw answers: a blank URL means the default target, only
    /// "y" forces a refresh, only "community" selects community mode.
    pub fn from_answers(url: &str, force_refresh: &str, mode: &str) -> Self {
        let url = url.trim();
        Self {
            url: if url.is_empty() {
                DEFAULT_TARGET_URL.to_string()
            } else {
                url.to_string()
            },
            force_refresh: force_refresh.trim().eq_ignore_ascii_case("y"),
            mode: Mode::from_input(mode),
        }
    }

    pub fn to_request(&self) -> RetrievalRequest {
        RetrievalRequest::new(self.url.clone(), self.force_refresh, self.mode)
    }
}

/// Result of the discovery stage. A failure leaves `tools` empty and is
/// never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolDiscovery {
    pub tools: Vec<Tool>,
    pub failure: Option<ApiError>,
}

/// One run of the retrieval workflow against a single shared client.
pub struct Session<Z = TokioSleeper> {
    client: ApiClient,
    poll_config: PollConfig,
    sleeper: Z,
}

impl Session<TokioSleeper> {
    pub fn new(client: ApiClient, poll_config: PollConfig) -> Self {
        Self::with_sleeper(client, poll_config, TokioSleeper)
    }
}

impl<Z: Sleeper> Session<Z> {
    pub fn with_sleeper(client: ApiClient, poll_config: PollConfig, sleeper: Z) -> Self {
        Self {
            client,
            poll_config,
            sleeper,
        }
    }

    pub async fn discover_tools(&self) -> ToolDiscovery {
        info!("discovering tools at {}", self.client.base_url());
        match self.client.list_tools().await {
            Ok(tools) => {
                info!("found {} tool(s)", tools.len());
                ToolDiscovery {
                    tools,
                    failure: None,
                }
            }
            Err(err) => {
                warn!("tool discovery failed: {err}");
                ToolDiscovery {
                    tools: Vec::new(),
                    failure: Some(err),
                }
            }
        }
    }

    pub async fn submit(&self, params: &RetrievalParams) -> Result<RetrievalSubmission, ApiError> {
        info!(
            "submitting {} (force_refresh={}, mode={})",
            params.url, params.force_refresh, params.mode
        );
        let submission = self
            .client
            .submit(&params.to_request())
            .await
            .inspect_err(|err| error!("submission failed: {err}"))?;
        info!(
            "request {} accepted with status {}",
            submission.request_id, submission.status
        );
        Ok(submission)
    }

    pub async fn poll<F>(&self, request_id: Uuid, on_event: F) -> PollOutcome
    where
        F: FnMut(&PollEvent),
    {
        poll_until_done(
            &self.client,
            &self.sleeper,
            request_id,
            &self.poll_config,
            on_event,
        )
        .await
    }

    /// Download the page data of a completed job and render its preview.
    pub async fn download_preview(&self, content: &ContentInfo) -> Result<String, ApiError> {
        info!("downloading {}", content.page_data_url);
        let data = self
            .client
            .download(&content.page_data_url)
            .await
            .inspect_err(|err| warn!("download failed: {err}"))?;
        Ok(render_preview(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_use_defaults() {
        let params = RetrievalParams::from_answers("", "", "");
        assert_eq!(params, RetrievalParams::default());
        let req = params.to_request();
        assert!(!req.force_refresh);
        assert_eq!(req.mode, Mode::Private);
        assert_eq!(req.timeout_seconds, 60);
    }

    #[test]
    fn answers_are_interpreted_loosely() {
        let params = RetrievalParams::from_answers("  https://rust-lang.org ", "Y", "Community");
        assert_eq!(params.url, "https://rust-lang.org");
        assert!(params.force_refresh);
        assert_eq!(params.mode, Mode::Community);

        let params = RetrievalParams::from_answers("https://a.example", "yes", "public");
        assert!(!params.force_refresh);
        assert_eq!(params.mode, Mode::Private);
    }
}
