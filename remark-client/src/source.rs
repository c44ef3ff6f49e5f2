use anyhow::{anyhow, Context};
use async_trait::async_trait;

use crate::{
    api::{self, Comment, NewComment, PostId},
    Error,
};

/// Where comments come from: the blog backend, or a mock of it.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// All the comments of `post`, flat and in no particular order
    async fn fetch_comments(&self, post: &PostId) -> Result<Vec<Comment>, Error>;

    async fn submit_comment(&self, post: &PostId, comment: NewComment) -> Result<Comment, Error>;
}

/// Decodes comments one by one, dropping the records that do not have the
/// shape of a comment.
pub fn decode_records(records: Vec<serde_json::Value>) -> Vec<Comment> {
    records
        .into_iter()
        .filter_map(|r| match serde_json::from_value::<Comment>(r) {
            Ok(c) => Some(c),
            Err(err) => {
                tracing::warn!(%err, "dropping malformed comment record");
                None
            }
        })
        .collect()
}

pub struct HttpSource {
    client: reqwest::Client,
    host: reqwest::Url,
}

impl HttpSource {
    pub fn new(host: &str) -> anyhow::Result<HttpSource> {
        HttpSource::with_client(reqwest::Client::new(), host)
    }

    pub fn with_client(client: reqwest::Client, host: &str) -> anyhow::Result<HttpSource> {
        let host = reqwest::Url::parse(host).with_context(|| format!("parsing host {host:?}"))?;
        if host.cannot_be_a_base() {
            return Err(anyhow!("host {host} cannot be used as a base url"));
        }
        Ok(HttpSource { client, host })
    }

    fn comments_url(&self, post: &PostId) -> anyhow::Result<reqwest::Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("host {} cannot be used as a base url", self.host))?
            .pop_if_empty()
            .extend(["api", "posts", post.as_str(), "comments"]);
        Ok(url)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await?;
        match api::Error::parse(&body) {
            Ok(err) => Err(Error::Api(err)),
            Err(parse_err) => {
                tracing::debug!(?parse_err, "server error body is not an api error");
                Err(Error::Anyhow(anyhow!("server answered with status {status}")))
            }
        }
    }
}

#[async_trait]
impl CommentSource for HttpSource {
    async fn fetch_comments(&self, post: &PostId) -> Result<Vec<Comment>, Error> {
        let url = self.comments_url(post)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching comments of post {post}"))?;
        let records: Vec<serde_json::Value> = HttpSource::check_status(resp)
            .await?
            .json()
            .await
            .with_context(|| format!("parsing comments of post {post}"))?;
        Ok(decode_records(records))
    }

    async fn submit_comment(&self, post: &PostId, comment: NewComment) -> Result<Comment, Error> {
        let url = self.comments_url(post)?;
        let resp = self
            .client
            .post(url)
            .json(&comment)
            .send()
            .await
            .with_context(|| format!("submitting comment to post {post}"))?;
        Ok(HttpSource::check_status(resp)
            .await?
            .json()
            .await
            .context("parsing created comment")?)
    }
}
