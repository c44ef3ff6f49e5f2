use crate::{CommentId, Error, PostId, Time};

pub const MAX_CONTENT_LEN: usize = 10_000;

/// A comment as stored by the backend, without any nesting information
/// besides `parent_id`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// None for a top-level comment
    #[serde(default)]
    pub parent_id: Option<CommentId>,

    pub author: String,
    pub content: String,
    pub created_at: Time,

    #[serde(default)]
    pub like_count: u64,
}

impl Comment {
    // Everything that reaches the tree builder went through this. Callers
    // drop the records that fail rather than aborting the whole list.
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_id(&self.id.0)?;
        crate::validate_id(&self.post_id.0)?;
        if let Some(parent) = &self.parent_id {
            crate::validate_id(&parent.0)?;
        }
        crate::validate_string(&self.author)?;
        validate_content(&self.content)?;
        crate::validate_time(&self.created_at)
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// What a client submits; the server fills in the id and the timestamp.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub author: String,
    pub content: String,
}

impl NewComment {
    pub fn new(author: String, content: String) -> NewComment {
        NewComment {
            parent_id: None,
            author,
            content,
        }
    }

    pub fn reply_to(parent: CommentId, author: String, content: String) -> NewComment {
        NewComment {
            parent_id: Some(parent),
            author,
            content,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(parent) = &self.parent_id {
            crate::validate_id(&parent.0)?;
        }
        crate::validate_string(&self.author)?;
        validate_content(&self.content)
    }
}

fn validate_content(content: &str) -> Result<(), Error> {
    crate::validate_string(content)?;
    if content.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    let len = content.chars().count();
    if len > MAX_CONTENT_LEN {
        return Err(Error::ContentTooLong(len));
    }
    Ok(())
}
