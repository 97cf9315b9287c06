//! PostgreSQL repository implementations.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, Statement,
    TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{Comment, Post, Tag, User, slugify};
use blog_core::error::RepoError;
use blog_core::pagination::{Page, PageSelector, num_pages_for};
use blog_core::ports::{
    CommentRepository, PostRepository, SearchHit, TagRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_err, write_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// Title weighs A, body weighs B; rank is computed once per published post
/// and filtered on the outer query.
pub(crate) const SEARCH_SQL: &str = r#"
SELECT id, rank FROM (
    SELECT p.id, p.publish,
           ts_rank(
               setweight(to_tsvector(COALESCE(p.title, '')), 'A') ||
               setweight(to_tsvector(COALESCE(p.body, '')), 'B'),
               plainto_tsquery($1)
           ) AS rank
    FROM posts p
    WHERE p.status = 'PB'
) ranked
WHERE rank >= $2
ORDER BY rank DESC, publish DESC
"#;

#[derive(Debug, FromQueryResult)]
struct RankedRow {
    id: Uuid,
    rank: f32,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

fn published() -> Select<PostEntity> {
    PostEntity::find()
        .filter(post::Column::Status.eq(post::Status::Published))
        .order_by_desc(post::Column::Publish)
}

/// Published posts, newest first, optionally restricted to one tag.
pub(crate) fn published_listing(tag_id: Option<Uuid>) -> Select<PostEntity> {
    match tag_id {
        Some(tag_id) => published()
            .join(
                sea_orm::JoinType::InnerJoin,
                post::Relation::PostTag.def(),
            )
            .filter(post_tag::Column::TagId.eq(tag_id)),
        None => published(),
    }
}

/// Other published posts sharing any of `tag_ids`, most shared tags first.
pub(crate) fn similar_to(post_id: Uuid, tag_ids: Vec<Uuid>, limit: u64) -> Select<PostEntity> {
    PostEntity::find()
        .join(
            sea_orm::JoinType::InnerJoin,
            post::Relation::PostTag.def(),
        )
        .filter(post::Column::Status.eq(post::Status::Published))
        .filter(post::Column::Id.ne(post_id))
        .filter(post_tag::Column::TagId.is_in(tag_ids))
        .group_by(post::Column::Id)
        .order_by(
            Expr::col((PostTagEntity, post_tag::Column::TagId)).count(),
            Order::Desc,
        )
        .order_by_desc(post::Column::Publish)
        .limit(limit)
}

impl PostgresPostRepository {
    /// Convert models to domain posts with their tags attached, keeping order.
    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let tags: HashMap<Uuid, Tag> = if links.is_empty() {
            HashMap::new()
        } else {
            let tag_ids: BTreeSet<Uuid> = links.iter().map(|l| l.tag_id).collect();
            TagEntity::find()
                .filter(tag::Column::Id.is_in(tag_ids))
                .all(&self.db)
                .await
                .map_err(query_err)?
                .into_iter()
                .map(|m| (m.id, Tag::from(m)))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|model| {
                let mut post = Post::from(model);
                post.tags = links
                    .iter()
                    .filter(|l| l.post_id == post.id)
                    .filter_map(|l| tags.get(&l.tag_id).cloned())
                    .collect();
                post.tags.sort_by(|a, b| a.name.cmp(&b.name));
                post
            })
            .collect())
    }

    async fn one_with_tags(&self, model: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn published_page(
        &self,
        tag_id: Option<Uuid>,
        selector: PageSelector,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        let paginator = published_listing(tag_id).paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(query_err)?;
        let num_pages = num_pages_for(total, per_page);
        let number = selector.resolve(num_pages);

        tracing::debug!(
            tag_id = ?tag_id,
            page = number,
            num_pages,
            "Fetching published posts"
        );

        let models = paginator
            .fetch_page(number - 1)
            .await
            .map_err(query_err)?;
        let items = self.with_tags(models).await?;

        Ok(Page::new(items, number, num_pages, total))
    }

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = published()
            .filter(post::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        self.one_with_tags(model).await
    }

    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let model = published()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(start))
            .filter(post::Column::Publish.lt(end))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        self.one_with_tags(model).await
    }

    async fn similar_posts(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tag_ids: Vec<Uuid> = PostTagEntity::find()
            .filter(post_tag::Column::PostId.eq(post.id))
            .all(&self.db)
            .await
            .map_err(query_err)?
            .into_iter()
            .map(|l| l.tag_id)
            .collect();

        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = similar_to(post.id, tag_ids, limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        self.with_tags(models).await
    }

    async fn search(&self, query: &str, min_rank: f32) -> Result<Vec<SearchHit>, RepoError> {
        tracing::debug!(query = %query, min_rank, "Searching published posts");

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SEARCH_SQL,
            [query.into(), min_rank.into()],
        );
        let rows = RankedRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let models = PostEntity::find()
            .filter(post::Column::Id.is_in(rows.iter().map(|r| r.id)))
            .all(&self.db)
            .await
            .map_err(query_err)?;
        let mut posts: HashMap<Uuid, Post> = self
            .with_tags(models)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                posts.remove(&row.id).map(|post| SearchHit {
                    post,
                    rank: row.rank,
                })
            })
            .collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn tags_for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .join(sea_orm::JoinType::InnerJoin, tag::Relation::PostTag.def())
            .filter(post_tag::Column::PostId.eq(post_id))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn tag_post(&self, post_id: Uuid, names: &[&str]) -> Result<Vec<Tag>, RepoError> {
        let txn = self.db.begin().await.map_err(query_err)?;

        for name in names {
            let name = name.trim();
            let slug = slugify(name);
            if slug.is_empty() {
                continue;
            }

            let existing = TagEntity::find()
                .filter(tag::Column::Slug.eq(slug.as_str()))
                .one(&txn)
                .await
                .map_err(query_err)?;

            let tag_id = match existing {
                Some(tag) => tag.id,
                None => {
                    let created = tag::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        name: Set(name.to_string()),
                        slug: Set(slug),
                    }
                    .insert(&txn)
                    .await
                    .map_err(write_err)?;
                    created.id
                }
            };

            PostTagEntity::insert(post_tag::ActiveModel {
                post_id: Set(post_id),
                tag_id: Set(tag_id),
            })
            .on_conflict(
                OnConflict::columns([post_tag::Column::PostId, post_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(write_err)?;
        }

        txn.commit().await.map_err(query_err)?;
        tracing::debug!(post_id = %post_id, count = names.len(), "Tagged post");

        self.tags_for_post(post_id).await
    }
}
