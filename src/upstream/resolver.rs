use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::UpstreamError;

/// The streamer API that turns a share link into a direct playable URL.
const RESOLVER_API: &str = "https://streamerapi1-2a11b7531678.herokuapp.com/";

#[derive(Deserialize)]
struct ResolvedVideo {
    url: String,
}

pub struct VideoResolver {
    client: Client,
}

impl VideoResolver {
    pub fn new(client: Client) -> Self {
        VideoResolver { client }
    }

    /// Ask the streamer API for a direct link to the video behind
    /// `share_link`.
    pub async fn resolve(&self, share_link: &str) -> Result<Url, UpstreamError> {
        let answer: ResolvedVideo = self
            .client
            .get(RESOLVER_API)
            .query(&[("link", share_link)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Url::parse(&answer.url)?)
    }
}
