use std::time::Duration;

use chrono::{TimeZone, Utc};
use remark_client::{
    api::{self, Comment, CommentId, NewComment, Order, OrderType, PostId},
    flatten_tree, CommentService, ServiceConfig,
};
use remark_mock_server::MockServer;

fn post() -> PostId {
    PostId::from("hello-world")
}

fn comment(id: &str, parent: Option<&str>, minute: u32, likes: u64) -> Comment {
    Comment {
        id: CommentId::from(id),
        post_id: post(),
        parent_id: parent.map(CommentId::from),
        author: String::from("ada"),
        content: format!("comment {id}"),
        created_at: Utc.with_ymd_and_hms(2023, 4, 5, 6, minute, 0).unwrap(),
        like_count: likes,
    }
}

fn ids(forest: &[remark_client::CommentTreeNode]) -> Vec<(usize, &str)> {
    flatten_tree(forest)
        .into_iter()
        .map(|n| (n.depth, n.comment.id.as_str()))
        .collect()
}

async fn seeded(comments: Vec<Comment>, config: ServiceConfig) -> CommentService<MockServer> {
    let server = MockServer::new();
    server.create_post(post()).await;
    for c in comments {
        server.insert_raw(c).await;
    }
    CommentService::new(server, config)
}

#[tokio::test]
async fn threads_come_from_cache() {
    let service = seeded(
        vec![comment("a", None, 1, 0), comment("b", Some("a"), 2, 0)],
        ServiceConfig::default(),
    )
    .await;
    let first = service.thread(&post()).await.unwrap();
    let second = service.thread(&post()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(ids(&first), vec![(0, "a"), (1, "b")]);
    assert_eq!(service.source().test_num_fetches(), 1);

    service.invalidate(&post());
    service.thread(&post()).await.unwrap();
    assert_eq!(service.source().test_num_fetches(), 2);
}

#[tokio::test]
async fn zero_ttl_always_refetches() {
    let service = seeded(
        vec![comment("a", None, 1, 0)],
        ServiceConfig {
            cache_ttl: Duration::ZERO,
            ..ServiceConfig::default()
        },
    )
    .await;
    for _ in 0..3 {
        service.comments(&post()).await.unwrap();
    }
    assert_eq!(service.source().test_num_fetches(), 3);
}

#[tokio::test]
async fn submitting_shows_up_in_next_thread() {
    let service = seeded(vec![comment("a", None, 1, 0)], ServiceConfig::default()).await;
    assert_eq!(ids(&service.thread(&post()).await.unwrap()), vec![(0, "a")]);

    let mut feed = service.source().comment_feed().await;
    let reply = service
        .submit(
            &post(),
            NewComment::reply_to(CommentId::from("a"), "bob".into(), "agreed".into()),
        )
        .await
        .unwrap();
    assert_eq!(feed.recv().await.as_ref(), Some(&reply));

    let thread = service.thread(&post()).await.unwrap();
    assert_eq!(ids(&thread), vec![(0, "a"), (1, reply.id.as_str())]);
    assert_eq!(service.source().test_num_fetches(), 2);
}

#[tokio::test]
async fn invalid_submission_is_not_sent() {
    let service = seeded(vec![], ServiceConfig::default()).await;
    let mut feed = service.source().comment_feed().await;
    let err = service
        .submit(&post(), NewComment::new("ada".into(), "".into()))
        .await
        .unwrap_err();
    assert_eq!(err.api(), Some(&api::Error::EmptyContent));
    assert!(feed.try_recv().is_err());
}

#[tokio::test]
async fn invalid_and_repeated_comments_are_dropped() {
    let mut nul_author = comment("b", None, 2, 0);
    nul_author.author = String::from("a\0b");
    let mut empty = comment("c", None, 3, 0);
    empty.content = String::from("   ");
    let mut repeated = comment("a", None, 4, 0);
    repeated.content = String::from("second copy");
    let service = seeded(
        vec![
            comment("a", None, 1, 0),
            nul_author,
            empty,
            repeated,
            comment("d", Some("c"), 5, 0),
        ],
        ServiceConfig::default(),
    )
    .await;

    let comments = service.comments(&post()).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].content, "comment a");

    // "d" lost its parent with "c" and is shown at the top level
    let thread = service.thread(&post()).await.unwrap();
    assert_eq!(ids(&thread), vec![(0, "d"), (0, "a")]);
}

#[tokio::test]
async fn config_drives_order_and_truncation() {
    let service = seeded(
        vec![
            comment("a", None, 1, 3),
            comment("b", None, 2, 7),
            comment("a1", Some("a"), 3, 1),
            comment("a2", Some("a"), 4, 5),
            comment("a3", Some("a"), 5, 2),
        ],
        ServiceConfig {
            order: Order::LikeCount(OrderType::Desc),
            max_replies: Some(2),
            ..ServiceConfig::default()
        },
    )
    .await;
    let thread = service.thread(&post()).await.unwrap();
    assert_eq!(ids(&thread), vec![(0, "b"), (0, "a"), (1, "a2"), (1, "a3")]);
    assert!(thread[1].has_more_replies);
    assert!(!thread[0].has_more_replies);
}

#[tokio::test]
async fn unknown_post_is_reported() {
    let service = CommentService::new(MockServer::new(), ServiceConfig::default());
    let err = service.thread(&post()).await.unwrap_err();
    assert_eq!(err.api(), Some(&api::Error::PostNotFound(post())));
}
