use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use remark_client::{
    api::{self, Comment, CommentId, NewComment, PostId},
    CommentSource, Error,
};
use tokio::sync::{mpsc, Mutex, RwLock};
use uuid::Uuid;

/// In-memory stand-in for the blog backend's comment endpoints.
pub struct MockServer {
    posts: RwLock<BTreeMap<PostId, Vec<Comment>>>,
    feeds: Mutex<Vec<mpsc::UnboundedSender<Comment>>>,
    fetches: AtomicUsize,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            posts: RwLock::new(BTreeMap::new()),
            feeds: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Returns false if the post already existed
    pub async fn create_post(&self, post: PostId) -> bool {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post) {
            return false;
        }
        posts.insert(post, Vec::new());
        true
    }

    /// Stores `comment` as-is, creating its post if need be. Nothing is
    /// validated, so tests can seed the malformed data real backends return.
    pub async fn insert_raw(&self, comment: Comment) {
        self.posts
            .write()
            .await
            .entry(comment.post_id.clone())
            .or_insert_with(Vec::new)
            .push(comment);
    }

    /// Number of `fetch_comments` calls served so far
    pub fn test_num_fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Receives every comment submitted from now on
    pub async fn comment_feed(&self) -> mpsc::UnboundedReceiver<Comment> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.feeds.lock().await.push(sender);
        receiver
    }

    async fn relay_comment(&self, c: &Comment) {
        self.feeds
            .lock()
            .await
            .retain_mut(|f| matches!(f.send(c.clone()), Ok(())));
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentSource for MockServer {
    async fn fetch_comments(&self, post: &PostId) -> Result<Vec<Comment>, Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.posts
            .read()
            .await
            .get(post)
            .cloned()
            .ok_or_else(|| api::Error::PostNotFound(post.clone()).into())
    }

    async fn submit_comment(&self, post: &PostId, comment: NewComment) -> Result<Comment, Error> {
        comment.validate()?;
        let created = {
            let mut posts = self.posts.write().await;
            let comments = posts
                .get_mut(post)
                .ok_or_else(|| api::Error::PostNotFound(post.clone()))?;
            if let Some(parent) = &comment.parent_id {
                if !comments.iter().any(|c| c.id == *parent) {
                    return Err(api::Error::ParentNotFound(parent.clone()).into());
                }
            }
            let created = Comment {
                id: CommentId(Uuid::new_v4().to_string()),
                post_id: post.clone(),
                parent_id: comment.parent_id,
                author: comment.author,
                content: comment.content,
                created_at: Utc::now(),
                like_count: 0,
            };
            comments.push(created.clone());
            created
        };
        tracing::debug!(%post, comment = %created.id, "mock server stored comment");
        self.relay_comment(&created).await;
        Ok(created)
    }
}
