use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{CommentId, PostId, Time};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Post not found {0}")]
    PostNotFound(PostId),

    #[error("Parent comment not found {0}")]
    ParentNotFound(CommentId),

    #[error("Empty identifier is not allowed")]
    EmptyId,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Time is out of the supported range {0}")]
    InvalidTime(Time),

    #[error("Comment content is empty")]
    EmptyContent,

    #[error("Comment content is too long ({0} chars)")]
    ContentTooLong(usize),
}

impl Error {
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PostNotFound(p) => json!({
                "message": "post not found",
                "type": "post-not-found",
                "post": p,
            }),
            Error::ParentNotFound(c) => json!({
                "message": "parent comment not found",
                "type": "parent-not-found",
                "comment": c,
            }),
            Error::EmptyId => json!({
                "message": "an identifier was empty",
                "type": "empty-id",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidTime(t) => json!({
                "message": "time is out of the supported range",
                "type": "invalid-time",
                "time": t,
            }),
            Error::EmptyContent => json!({
                "message": "comment content is empty",
                "type": "empty-content",
            }),
            Error::ContentTooLong(len) => json!({
                "message": "comment content is too long",
                "type": "content-too-long",
                "len": len,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| data.get(name).and_then(|v| v.as_str());
        Ok(
            match field("type").ok_or_else(|| anyhow!("error type is not a string"))? {
                "unknown" => Error::Unknown(String::from(field("message").unwrap_or(""))),
                "post-not-found" => Error::PostNotFound(PostId::from(
                    field("post").ok_or_else(|| anyhow!("error is a missing post without a post"))?,
                )),
                "parent-not-found" => Error::ParentNotFound(CommentId::from(
                    field("comment")
                        .ok_or_else(|| anyhow!("error is a missing parent without a comment"))?,
                )),
                "empty-id" => Error::EmptyId,
                "null-byte" => Error::NullByteInString(String::from(
                    field("string").ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "invalid-time" => Error::InvalidTime(
                    field("time")
                        .ok_or_else(|| anyhow!("error is an invalid time without a time"))?
                        .parse()
                        .context("parsing time of invalid-time error")?,
                ),
                "empty-content" => Error::EmptyContent,
                "content-too-long" => Error::ContentTooLong(
                    data.get("len")
                        .and_then(|l| l.as_u64())
                        .ok_or_else(|| anyhow!("error is a too-long content without a length"))?
                        as usize,
                ),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
