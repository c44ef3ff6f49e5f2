use std::cmp::Ordering;

use crate::{
    api::{Comment, Order, OrderType},
    CommentTreeNode,
};

pub trait OrderExt {
    fn compare(&self, a: &Comment, b: &Comment) -> Ordering;

    /// Sorts a single sibling list
    fn sort(&self, nodes: &mut [CommentTreeNode]);

    /// Sorts every sibling list of the forest, at every depth
    fn sort_forest(&self, forest: &mut [CommentTreeNode]);
}

impl OrderExt for Order {
    /// Total order: ties on the requested key fall back to newest first, then
    /// to the id, so sorting never depends on the order of the input.
    fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        let by_key = match self {
            Order::CreationDate(OrderType::Asc) => a.created_at.cmp(&b.created_at),
            Order::CreationDate(OrderType::Desc) => b.created_at.cmp(&a.created_at),
            Order::LikeCount(OrderType::Asc) => a.like_count.cmp(&b.like_count),
            Order::LikeCount(OrderType::Desc) => b.like_count.cmp(&a.like_count),
        };
        by_key
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }

    fn sort(&self, nodes: &mut [CommentTreeNode]) {
        nodes.sort_unstable_by(|a, b| self.compare(&a.comment, &b.comment))
    }

    fn sort_forest(&self, forest: &mut [CommentTreeNode]) {
        let mut todo = vec![forest];
        while let Some(nodes) = todo.pop() {
            self.sort(nodes);
            for n in nodes {
                todo.push(n.replies.as_mut_slice());
            }
        }
    }
}
