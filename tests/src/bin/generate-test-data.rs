use anyhow::Context;
use chrono::{Duration, TimeZone, Utc};
use rand::{seq::SliceRandom, Rng};
use remark_client::api::{Comment, CommentId, PostId};

const NUM_AUTHORS: usize = 8;
const COMMENT_MIN_WORDS: usize = 5;
const COMMENT_MAX_WORDS: usize = 60;
const MAX_LIKES: u64 = 40;

/// Prints a JSON array of comments suitable for `remark-ctl tree`
#[derive(structopt::StructOpt)]
struct Opt {
    /// Post the comments belong to
    #[structopt(long, default_value = "hello-world")]
    post: String,

    #[structopt(short, long, default_value = "100")]
    num_comments: usize,

    /// Probability that a comment answers an earlier one
    #[structopt(long, default_value = "0.7")]
    reply_chance: f64,

    /// Probability that a reply points at a comment missing from the dump
    #[structopt(long, default_value = "0.02")]
    dangling_chance: f64,
}

fn gen_author() -> String {
    lipsum::lipsum_words(1).to_lowercase().replace(|c: char| !c.is_alphanumeric(), "")
}

fn gen_content(rng: &mut impl Rng) -> String {
    lipsum::lipsum_words(rng.gen_range(COMMENT_MIN_WORDS..=COMMENT_MAX_WORDS))
}

fn main() -> anyhow::Result<()> {
    let opt = <Opt as structopt::StructOpt>::from_args();
    let mut rng = rand::thread_rng();
    let post = PostId(opt.post);
    let authors = (0..NUM_AUTHORS).map(|_| gen_author()).collect::<Vec<_>>();

    let mut time = Utc
        .with_ymd_and_hms(2023, 1, 1, 12, 0, 0)
        .single()
        .context("building start time")?;
    let mut comments: Vec<Comment> = Vec::with_capacity(opt.num_comments);
    for _ in 0..opt.num_comments {
        // replies always come after what they answer
        time = time + Duration::seconds(rng.gen_range(1..3600));
        let parent_id = match comments.is_empty() || !rng.gen_bool(opt.reply_chance) {
            true => None,
            false if rng.gen_bool(opt.dangling_chance) => {
                Some(CommentId(uuid::Uuid::new_v4().to_string()))
            }
            false => Some(comments[rng.gen_range(0..comments.len())].id.clone()),
        };
        comments.push(Comment {
            id: CommentId(uuid::Uuid::new_v4().to_string()),
            post_id: post.clone(),
            parent_id,
            author: authors.choose(&mut rng).cloned().unwrap_or_default(),
            content: gen_content(&mut rng),
            created_at: time,
            like_count: rng.gen_range(0..=MAX_LIKES),
        });
    }

    // the backend hands comments out in no particular order
    comments.shuffle(&mut rng);
    println!("{}", serde_json::to_string_pretty(&comments)?);
    Ok(())
}
