use chrono::{Datelike, Utc};

mod comment;
pub use comment::{Comment, NewComment, MAX_CONTENT_LEN};

mod error;
pub use error::Error;

mod order;
pub use order::{Order, OrderType};

pub type Time = chrono::DateTime<Utc>;

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> CommentId {
        CommentId(String::from(s))
    }
}

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> PostId {
        PostId(String::from(s))
    }
}

// Strings coming from the backend end up in HTML and in C-string based
// stores, so NUL bytes are refused everywhere.
pub(crate) fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}

pub(crate) fn validate_id(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.is_empty() {
        return Err(Error::EmptyId);
    }
    Ok(())
}

pub(crate) fn validate_time(t: &Time) -> Result<(), Error> {
    if !(1970..=9999).contains(&t.year()) {
        return Err(Error::InvalidTime(*t));
    }
    Ok(())
}
