use std::collections::{HashMap, HashSet};

use crate::{
    api::{Comment, CommentId, Order},
    OrderExt,
};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentTreeNode {
    #[serde(flatten)]
    pub comment: Comment,

    /// Direct replies, in display order
    pub replies: Vec<CommentTreeNode>,

    /// 0 for top-level comments
    pub depth: usize,

    /// Set when `replies` was truncated, see `limit_replies`
    pub has_more_replies: bool,
}

impl CommentTreeNode {
    fn new(comment: Comment, depth: usize, replies: Vec<CommentTreeNode>) -> CommentTreeNode {
        CommentTreeNode {
            comment,
            replies,
            depth,
            has_more_replies: false,
        }
    }

    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Number of descendants, at any depth
    pub fn reply_count(&self) -> usize {
        count_nodes(&self.replies)
    }
}

// Derived drop glue would recurse once per nesting level
impl Drop for CommentTreeNode {
    fn drop(&mut self) {
        let mut todo = std::mem::take(&mut self.replies);
        while let Some(mut n) = todo.pop() {
            todo.append(&mut n.replies);
        }
    }
}

/// Builds the reply forest with the default ordering (newest first).
pub fn build_tree(comments: Vec<Comment>) -> Vec<CommentTreeNode> {
    build_tree_ordered(comments, &Order::default())
}

/// Nests `comments` under their parents and sorts every sibling list with
/// `order`.
///
/// Comments whose parent is not part of `comments` become top-level
/// comments, as do self-replies. If the parent links form a cycle, the
/// oldest comment of the cycle is made top-level. Only the first comment of
/// a given id is kept. Every remaining comment appears exactly once in the
/// output, whatever the order of `comments`.
pub fn build_tree_ordered(comments: Vec<Comment>, order: &Order) -> Vec<CommentTreeNode> {
    let comments = dedup(comments);
    let n = comments.len();

    let mut parents = {
        let index = comments
            .iter()
            .enumerate()
            .map(|(i, c)| (&c.id, i))
            .collect::<HashMap<_, _>>();
        comments
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let parent_id = c.parent_id.as_ref()?;
                match index.get(parent_id) {
                    Some(&p) if p != i => Some(p),
                    Some(_) => {
                        tracing::debug!(
                            comment = %c.id,
                            "comment replies to itself, moving it to top level"
                        );
                        None
                    }
                    None => {
                        tracing::debug!(
                            comment = %c.id,
                            parent = %parent_id,
                            "parent comment not found, moving comment to top level"
                        );
                        None
                    }
                }
            })
            .collect::<Vec<Option<usize>>>()
    };
    break_cycles(&comments, &mut parents);

    let mut children = vec![Vec::new(); n];
    let mut roots = Vec::new();
    for (i, p) in parents.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    // Breadth-first from the roots: every comment comes after its parent
    let mut depths = vec![0; n];
    let mut by_level = roots.clone();
    let mut next = 0;
    while let Some(&u) = by_level.get(next) {
        for &c in &children[u] {
            depths[c] = depths[u] + 1;
            by_level.push(c);
        }
        next += 1;
    }
    debug_assert_eq!(by_level.len(), n, "some comments are unreachable from the roots");

    // Assemble bottom-up so that children are complete before their parent
    let mut comments = comments.into_iter().map(Some).collect::<Vec<_>>();
    let mut built: Vec<Option<CommentTreeNode>> = (0..n).map(|_| None).collect();
    for &u in by_level.iter().rev() {
        let mut replies = children[u]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect::<Vec<_>>();
        order.sort(&mut replies);
        if let Some(comment) = comments[u].take() {
            built[u] = Some(CommentTreeNode::new(comment, depths[u], replies));
        }
    }

    let mut forest = roots
        .into_iter()
        .filter_map(|r| built[r].take())
        .collect::<Vec<_>>();
    order.sort(&mut forest);
    forest
}

pub(crate) fn dedup(comments: Vec<Comment>) -> Vec<Comment> {
    let mut seen = HashSet::with_capacity(comments.len());
    comments
        .into_iter()
        .filter(|c| {
            let fresh = seen.insert(c.id.clone());
            if !fresh {
                tracing::warn!(comment = %c.id, "dropping comment with an already-seen id");
            }
            fresh
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Mark {
    New,
    /// On the path currently being followed, at this position
    OnPath(usize),
    Done,
}

/// Cuts every cycle of the parent graph at its oldest comment.
///
/// Each comment has at most one parent, so following parents from any
/// comment either reaches a root or loops; each loop is a distinct cycle.
fn break_cycles(comments: &[Comment], parents: &mut [Option<usize>]) {
    let mut marks = vec![Mark::New; parents.len()];
    let mut path = Vec::new();
    for start in 0..parents.len() {
        let mut cur = Some(start);
        while let Some(u) = cur {
            match marks[u] {
                Mark::Done => break,
                Mark::OnPath(pos) => {
                    let oldest = path[pos..].iter().copied().min_by(|&a: &usize, &b: &usize| {
                        let (a, b) = (&comments[a], &comments[b]);
                        (a.created_at, &a.id).cmp(&(b.created_at, &b.id))
                    });
                    if let Some(oldest) = oldest {
                        tracing::warn!(
                            comment = %comments[oldest].id,
                            cycle_len = path.len() - pos,
                            "reply cycle detected, moving its oldest comment to top level"
                        );
                        parents[oldest] = None;
                    }
                    break;
                }
                Mark::New => {
                    marks[u] = Mark::OnPath(path.len());
                    path.push(u);
                    cur = parents[u];
                }
            }
        }
        for u in path.drain(..) {
            marks[u] = Mark::Done;
        }
    }
}

/// Pre-order, depth-first iterator over a forest.
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, CommentTreeNode>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a CommentTreeNode;

    fn next(&mut self) -> Option<&'a CommentTreeNode> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    self.stack.push(node.replies.iter());
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

pub fn walk(forest: &[CommentTreeNode]) -> Walk<'_> {
    Walk {
        stack: vec![forest.iter()],
    }
}

/// Every node of the forest, each before its replies, in display order.
pub fn flatten_tree(forest: &[CommentTreeNode]) -> Vec<&CommentTreeNode> {
    walk(forest).collect()
}

pub fn count_nodes(forest: &[CommentTreeNode]) -> usize {
    walk(forest).count()
}

pub fn find_in<'a>(forest: &'a [CommentTreeNode], id: &CommentId) -> Option<&'a CommentTreeNode> {
    walk(forest).find(|n| n.comment.id == *id)
}

/// Keeps at most `max` replies under each comment, flagging the comments
/// that lost some with `has_more_replies`. Top-level comments are not
/// limited.
pub fn limit_replies(forest: &mut [CommentTreeNode], max: usize) {
    let mut todo = vec![forest];
    while let Some(nodes) = todo.pop() {
        for n in nodes {
            if n.replies.len() > max {
                n.replies.truncate(max);
                n.has_more_replies = true;
            }
            todo.push(n.replies.as_mut_slice());
        }
    }
}
