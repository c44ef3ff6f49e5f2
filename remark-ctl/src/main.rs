use std::path::{Path, PathBuf};

use anyhow::Context;
use remark_client::{
    api::{Comment, Order, PostId},
    build_tree_ordered, decode_records, flatten_tree, limit_replies, sanitize,
    CommentService, CommentTreeNode, HttpSource, ServiceConfig,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Render a JSON dump of flat comments as a thread
    Tree {
        /// File holding a JSON array of comments
        file: PathBuf,

        #[structopt(flatten)]
        display: DisplayOpts,
    },

    /// List the comments of a JSON dump in display order, one per line
    Flatten {
        /// File holding a JSON array of comments
        file: PathBuf,

        /// One of newest, oldest, most-liked, least-liked
        #[structopt(short, long, default_value = "newest")]
        order: Order,
    },

    /// Fetch the comments of a post from the blog backend and render them
    Fetch {
        /// Base url of the blog backend
        #[structopt(long, env = "REMARK_HOST")]
        host: String,

        /// Post whose comments to fetch
        post: String,

        #[structopt(flatten)]
        display: DisplayOpts,
    },
}

#[derive(structopt::StructOpt)]
struct DisplayOpts {
    /// One of newest, oldest, most-liked, least-liked
    #[structopt(short, long, default_value = "newest")]
    order: Order,

    /// Keep at most this many replies under each comment
    #[structopt(long)]
    max_replies: Option<usize>,

    /// Print the thread as JSON instead of text
    #[structopt(long)]
    json: bool,
}

impl DisplayOpts {
    fn print(&self, forest: &[CommentTreeNode]) -> anyhow::Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(forest).context("serializing thread")?
            );
        } else {
            print!("{}", render(forest));
        }
        Ok(())
    }
}

async fn read_dump(file: &Path) -> anyhow::Result<Vec<Comment>> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading comment dump {file:?}"))?;
    let records = serde_json::from_slice(&data)
        .with_context(|| format!("parsing comment dump {file:?} as a json array"))?;
    let comments = sanitize(decode_records(records));
    tracing::debug!(num_comments = comments.len(), "read comment dump");
    Ok(comments)
}

enum Line<'a> {
    Comment(&'a CommentTreeNode),
    /// Closes the subtree of a comment whose replies were truncated
    MoreReplies(usize),
}

fn render(forest: &[CommentTreeNode]) -> String {
    let mut res = String::new();
    let mut todo = forest.iter().rev().map(Line::Comment).collect::<Vec<_>>();
    while let Some(line) = todo.pop() {
        let n = match line {
            Line::Comment(n) => n,
            Line::MoreReplies(depth) => {
                let indent = "    ".repeat(depth + 1);
                res.push_str(&format!("{indent}(more replies)\n"));
                continue;
            }
        };
        let indent = "    ".repeat(n.depth);
        let c = &n.comment;
        res.push_str(&format!(
            "{indent}{} ({}, {} likes) [{}]\n",
            c.author,
            c.created_at.format("%Y-%m-%d %H:%M"),
            c.like_count,
            c.id,
        ));
        for line in c.content.lines() {
            res.push_str(&format!("{indent}  {line}\n"));
        }
        if n.has_more_replies {
            todo.push(Line::MoreReplies(n.depth));
        }
        todo.extend(n.replies.iter().rev().map(Line::Comment));
    }
    res
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    match opt.cmd {
        Command::Tree { file, display } => {
            let mut forest = build_tree_ordered(read_dump(&file).await?, &display.order);
            if let Some(max) = display.max_replies {
                limit_replies(&mut forest, max);
            }
            display.print(&forest)?;
        }
        Command::Flatten { file, order } => {
            let forest = build_tree_ordered(read_dump(&file).await?, &order);
            for n in flatten_tree(&forest) {
                println!("{}\t{}", n.depth, n.comment.id);
            }
        }
        Command::Fetch {
            host,
            post,
            display,
        } => {
            let service = CommentService::new(
                HttpSource::new(&host)?,
                ServiceConfig {
                    order: display.order,
                    max_replies: display.max_replies,
                    ..ServiceConfig::default()
                },
            );
            let post = PostId(post);
            let forest = service
                .thread(&post)
                .await
                .with_context(|| format!("fetching thread of post {post} from {host}"))?;
            display.print(&forest)?;
        }
    }

    Ok(())
}
