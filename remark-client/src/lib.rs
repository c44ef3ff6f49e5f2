mod cache;
pub use cache::TtlCache;

mod error;
pub use error::Error;

mod order;
pub use order::OrderExt;

mod service;
pub use service::{sanitize, CommentService, ServiceConfig};

mod source;
pub use source::{decode_records, CommentSource, HttpSource};

mod tree;
pub use tree::{
    build_tree, build_tree_ordered, count_nodes, find_in, flatten_tree, limit_replies, walk,
    CommentTreeNode, Walk,
};

mod fuzz;

pub mod api {
    pub use remark_api::*;
}

pub mod prelude {
    pub use crate::OrderExt;
}
