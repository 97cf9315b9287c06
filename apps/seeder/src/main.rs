//! Seed the blog database with an author and a handful of tagged posts.
//!
//! Run the migrations first. Seeding is idempotent per author and slug:
//! posts already present for the same publish date are skipped.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;

use blog_core::domain::{Post, User};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, TagRepository, UserRepository};
use blog_infra::database::{
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository,
};
use blog_infra::{DatabaseConfig, DatabaseConnections};

#[derive(Parser)]
#[command(name = "seeder")]
#[command(about = "Load sample blog content")]
#[command(version)]
struct Args {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Username of the author owning the sample posts
    #[arg(long, default_value = "admin")]
    author: String,

    /// Email of the author, used when the author is created
    #[arg(long, default_value = "admin@localhost")]
    email: String,

    /// Leave every sample post as a draft
    #[arg(long)]
    drafts: bool,
}

struct Sample {
    title: &'static str,
    body: &'static str,
    tags: &'static [&'static str],
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "Who was Django Reinhardt?",
        body: "Django Reinhardt was a Belgian-born Romani-French jazz guitarist and composer.\n\
               He was one of the first major jazz talents to emerge in Europe.",
        tags: &["music", "jazz"],
    },
    Sample {
        title: "Gypsy jazz for beginners",
        body: "Start with the pompe rhythm and learn the standards by ear.",
        tags: &["music", "jazz", "guitar"],
    },
    Sample {
        title: "Choosing your first guitar",
        body: "Action, scale length and budget matter more than the brand on the headstock.",
        tags: &["guitar"],
    },
    Sample {
        title: "Notes on full-text search",
        body: "Weighted vectors let a title match outrank a match buried in the body.",
        tags: &["postgres", "search"],
    },
    Sample {
        title: "Paginating without surprises",
        body: "Out-of-range pages fall back to the last page instead of failing.",
        tags: &["postgres"],
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();

    let config = DatabaseConfig {
        url: args.database_url.clone(),
        max_connections: 5,
        min_connections: 1,
    };
    let db = DatabaseConnections::init(&config)
        .await
        .context("connecting to the database")?
        .main;

    let users = PostgresUserRepository::new(db.clone());
    let posts = PostgresPostRepository::new(db.clone());
    let tags = PostgresTagRepository::new(db);

    let author = match users.find_by_username(&args.author).await? {
        Some(user) => user,
        None => users
            .save(User::new(args.author.clone(), args.email.clone()))
            .await
            .context("creating the author")?,
    };
    tracing::info!(author = %author.username, "Seeding posts");

    let now = Utc::now();
    let mut created = 0;
    for (offset, sample) in SAMPLES.iter().enumerate() {
        let mut post = Post::new(author.id, sample.title, sample.body)?;
        post.publish = now - Duration::days(offset as i64);
        if !args.drafts {
            post = post.published();
        }

        let post = match posts.save(post).await {
            Ok(post) => post,
            Err(RepoError::Constraint(reason)) => {
                tracing::warn!(title = sample.title, %reason, "Skipping existing post");
                continue;
            }
            Err(e) => return Err(e).context(format!("saving '{}'", sample.title)),
        };

        let attached = tags.tag_post(post.id, sample.tags).await?;
        tracing::info!(title = %post.title, tags = attached.len(), "Post created");
        created += 1;
    }

    tracing::info!(created, total = SAMPLES.len(), "Seeding finished");
    Ok(())
}
