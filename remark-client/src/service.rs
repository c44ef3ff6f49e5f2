use std::{sync::Arc, time::Duration};

use crate::{
    api::{Comment, NewComment, Order, PostId},
    build_tree_ordered, limit_replies, tree, CommentSource, CommentTreeNode, Error, TtlCache,
};

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Ordering applied to every sibling list of a thread
    pub order: Order,

    /// How long a fetched comment list is reused before refetching
    pub cache_ttl: Duration,

    /// If set, threads keep at most this many replies per comment
    pub max_replies: Option<usize>,
}

impl Default for ServiceConfig {
    fn default() -> ServiceConfig {
        ServiceConfig {
            order: Order::default(),
            cache_ttl: Duration::from_secs(5 * 60),
            max_replies: None,
        }
    }
}

/// Drops the comments that fail validation and the repeated ids.
pub fn sanitize(comments: Vec<Comment>) -> Vec<Comment> {
    let valid = comments
        .into_iter()
        .filter(|c| match c.validate() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(comment = %c.id, %err, "dropping invalid comment");
                false
            }
        })
        .collect();
    tree::dedup(valid)
}

pub struct CommentService<S> {
    source: S,
    config: ServiceConfig,
    cache: TtlCache<PostId, Arc<Vec<Comment>>>,
}

impl<S: CommentSource> CommentService<S> {
    pub fn new(source: S, config: ServiceConfig) -> CommentService<S> {
        CommentService {
            cache: TtlCache::new(config.cache_ttl),
            source,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The sanitized flat comment list of `post`, from cache if still fresh
    pub async fn comments(&self, post: &PostId) -> Result<Arc<Vec<Comment>>, Error> {
        if let Some(comments) = self.cache.get(post) {
            tracing::trace!(%post, "comment cache hit");
            return Ok(comments);
        }
        // A submit landing while the fetch is in flight must win
        let generation = self.cache.generation();
        let fetched = self.source.fetch_comments(post).await?;
        let num_fetched = fetched.len();
        let comments = Arc::new(sanitize(fetched));
        tracing::debug!(
            %post,
            num_fetched,
            num_kept = comments.len(),
            "fetched comments"
        );
        if !self
            .cache
            .insert_if_current(post.clone(), comments.clone(), generation)
        {
            tracing::debug!(%post, "cache invalidated during fetch, not caching");
        }
        Ok(comments)
    }

    pub async fn thread(&self, post: &PostId) -> Result<Vec<CommentTreeNode>, Error> {
        let comments = self.comments(post).await?;
        let mut forest = build_tree_ordered(Vec::clone(&comments), &self.config.order);
        if let Some(max) = self.config.max_replies {
            limit_replies(&mut forest, max);
        }
        Ok(forest)
    }

    pub async fn submit(&self, post: &PostId, comment: NewComment) -> Result<Comment, Error> {
        comment.validate()?;
        let created = self.source.submit_comment(post, comment).await?;
        tracing::debug!(%post, comment = %created.id, "submitted comment");
        self.invalidate(post);
        Ok(created)
    }

    pub fn invalidate(&self, post: &PostId) {
        self.cache.invalidate(post);
    }
}
