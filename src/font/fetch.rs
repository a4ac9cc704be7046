//! Downloading font payloads.

use std::time::Duration;

use crate::error::FontpressResult;

/// A downloaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// The response body.
    pub bytes: Vec<u8>,
    /// How long the download took.
    pub elapsed: Duration,
}

/// Something that can download a URL.
///
/// Implementations report non-success statuses and transport failures as
/// [`FontpressError::DownloadFailed`].
///
/// [`FontpressError::DownloadFailed`]: crate::error::FontpressError::DownloadFailed
pub trait Fetch {
    /// Download the body behind a URL.
    fn fetch(&self, url: &str) -> FontpressResult<Fetched>;
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::{Duration, Instant};

    use log::{info, warn};
    use ureq::Agent;

    use super::{Fetch, Fetched};
    use crate::configure::FetchSettings;
    use crate::error::{FontpressError, FontpressResult};

    /// Downloads fonts over HTTP(S), bounded in time and size.
    pub struct HttpFetcher {
        agent: Agent,
        max_bytes: u64,
    }

    impl HttpFetcher {
        /// Create a new fetcher.
        pub fn new(settings: &FetchSettings) -> Self {
            let config = Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
                .build();

            Self {
                agent: Agent::new_with_config(config),
                max_bytes: settings.max_download_bytes,
            }
        }
    }

    impl Fetch for HttpFetcher {
        fn fetch(&self, url: &str) -> FontpressResult<Fetched> {
            let start = Instant::now();

            let mut response = match self.agent.get(url).call() {
                Ok(response) => response,
                Err(ureq::Error::StatusCode(status)) => {
                    warn!("download of {url} returned status {status}");
                    return Err(FontpressError::DownloadFailed(Some(status)));
                }
                Err(e) => {
                    warn!("download of {url} failed: {e}");
                    return Err(FontpressError::DownloadFailed(None));
                }
            };

            let bytes = response
                .body_mut()
                .with_config()
                .limit(self.max_bytes)
                .read_to_vec()
                .map_err(|e| {
                    warn!("failed to read body of {url}: {e}");
                    FontpressError::DownloadFailed(None)
                })?;

            let elapsed = start.elapsed();
            info!(
                "downloaded {} bytes from {url} in {:.3}s",
                bytes.len(),
                elapsed.as_secs_f64()
            );

            Ok(Fetched { bytes, elapsed })
        }
    }
}
