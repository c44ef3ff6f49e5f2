#![cfg(test)]

use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};

use crate::{
    api::{Comment, CommentId, Order, OrderType, PostId},
    build_tree_ordered, count_nodes, flatten_tree, walk, CommentTreeNode, OrderExt,
};

/// For each comment: parent choice, seconds after the epoch of the thread,
/// like count. The last byte picks the ordering.
type Input = (Vec<(Option<u8>, u16, u8)>, u8);

fn gen_comments((shape, order): Input) -> (Vec<Comment>, Order) {
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    let n = shape.len();
    let comments = shape
        .into_iter()
        .enumerate()
        .map(|(i, (parent, secs, likes))| Comment {
            id: CommentId(format!("c{i}")),
            post_id: PostId::from("post"),
            // Pointing a bit past the end gives dangling parents; self
            // references and cycles come for free
            parent_id: parent.map(|p| CommentId(format!("c{}", p as usize % (n + 3)))),
            author: String::from("fuzz"),
            content: String::from("fuzz"),
            // Few distinct values, to exercise tie-breaking
            created_at: start + Duration::seconds(i64::from(secs % 64)),
            like_count: u64::from(likes % 4),
        })
        .collect();
    let order = match order % 4 {
        0 => Order::CreationDate(OrderType::Desc),
        1 => Order::CreationDate(OrderType::Asc),
        2 => Order::LikeCount(OrderType::Desc),
        _ => Order::LikeCount(OrderType::Asc),
    };
    (comments, order)
}

macro_rules! forest_check {
    ( $name:ident, $fn:expr ) => {
        #[test]
        fn $name() {
            bolero::check!()
                .with_type::<Input>()
                .cloned()
                .for_each(|input| {
                    let (comments, order) = gen_comments(input);
                    $fn(comments, order)
                })
        }
    };
}

forest_check!(node_count_is_conserved, check_node_count);
fn check_node_count(comments: Vec<Comment>, order: Order) {
    let n = comments.len();
    let forest = build_tree_ordered(comments, &order);
    assert_eq!(count_nodes(&forest), n);
}

forest_check!(flatten_lists_each_comment_once, check_flatten);
fn check_flatten(comments: Vec<Comment>, order: Order) {
    let mut expected = comments.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
    let forest = build_tree_ordered(comments, &order);
    let mut got = flatten_tree(&forest)
        .into_iter()
        .map(|n| n.comment.id.clone())
        .collect::<Vec<_>>();
    expected.sort();
    got.sort();
    assert_eq!(got, expected);
}

forest_check!(depths_follow_nesting, check_depths);
fn check_depths(comments: Vec<Comment>, order: Order) {
    let forest = build_tree_ordered(comments, &order);
    assert!(forest.iter().all(|r| r.depth == 0));
    for n in walk(&forest) {
        for r in &n.replies {
            assert_eq!(r.depth, n.depth + 1);
            assert_eq!(r.comment.parent_id.as_ref(), Some(&n.comment.id));
        }
    }
}

forest_check!(siblings_are_sorted, check_sorted);
fn check_sorted(comments: Vec<Comment>, order: Order) {
    let forest = build_tree_ordered(comments, &order);
    let is_sorted = |nodes: &[CommentTreeNode]| {
        nodes
            .windows(2)
            .all(|w| order.compare(&w[0].comment, &w[1].comment).is_lt())
    };
    assert!(is_sorted(&forest));
    assert!(walk(&forest).all(|n| is_sorted(&n.replies)));
}

forest_check!(input_order_does_not_matter, check_permutations);
fn check_permutations(comments: Vec<Comment>, order: Order) {
    let forest = build_tree_ordered(comments.clone(), &order);

    let mut reversed = comments.clone();
    reversed.reverse();
    assert_eq!(build_tree_ordered(reversed, &order), forest);

    let mut rotated = comments;
    let len = rotated.len();
    if len > 0 {
        rotated.rotate_left(len / 3);
    }
    assert_eq!(build_tree_ordered(rotated, &order), forest);
}

#[test]
fn any_shuffle_builds_the_same_forest() {
    bolero::check!()
        .with_type::<(Input, Vec<u16>)>()
        .cloned()
        .for_each(|(input, keys)| {
            let (comments, order) = gen_comments(input);
            let forest = build_tree_ordered(comments.clone(), &order);

            // Stable sort on generated keys reaches every permutation
            let mut shuffled = comments.into_iter().enumerate().collect::<Vec<_>>();
            shuffled.sort_by_key(|(i, _)| keys.get(*i).copied().unwrap_or(0));
            let shuffled = shuffled.into_iter().map(|(_, c)| c).collect();
            assert_eq!(build_tree_ordered(shuffled, &order), forest);
        })
}

forest_check!(unresolvable_parents_become_roots, check_dangling);
fn check_dangling(comments: Vec<Comment>, order: Order) {
    let ids = comments.iter().map(|c| c.id.clone()).collect::<HashSet<_>>();
    let must_be_roots = comments
        .iter()
        .filter(|c| match &c.parent_id {
            None => true,
            Some(p) => !ids.contains(p) || *p == c.id,
        })
        .map(|c| c.id.clone())
        .collect::<Vec<_>>();
    let forest = build_tree_ordered(comments, &order);
    let roots = forest.iter().map(|r| &r.comment.id).collect::<HashSet<_>>();
    for id in &must_be_roots {
        assert!(roots.contains(id), "{id} should be a root");
    }
}

#[test]
fn replies_are_never_flagged_as_truncated() {
    bolero::check!()
        .with_type::<Input>()
        .cloned()
        .for_each(|input| {
            let (comments, order) = gen_comments(input);
            let forest = build_tree_ordered(comments, &order);
            assert!(walk(&forest).all(|n| !n.has_more_replies));
        })
}
