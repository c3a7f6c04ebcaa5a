use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::contains_pattern;
use crate::data::pagination::{Page, PageRequest};
use crate::data::post_repository::{NewPost, PostFilter, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

const POST_COLUMNS: &str = "p.id, p.title, p.content, p.is_published, p.author_id, \
     u.username AS author_username, p.created_at, p.updated_at";

const FILTER: &str = "($1::BIGINT IS NULL OR p.author_id = $1) AND (NOT $2 OR p.is_published)";

const SEARCH: &str = "p.is_published AND (p.title ILIKE $1 OR p.content ILIKE $1)";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    is_published: bool,
    author_id: i64,
    author_username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (title, content, is_published, author_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.is_published)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_post_db_error(err, input.author_id))?;

        Ok(map_row_to_post(row))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id WHERE p.id = $1"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(map_row_to_post))
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET title = $2,
                    content = $3,
                    is_published = $4,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post.id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.is_published)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(map_row_to_post))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        // comments go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE {FILTER}
            ORDER BY {}
            LIMIT $3
            OFFSET $4
            "#,
            page.sort.order_by(Some("p"))
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(filter.author_id)
            .bind(filter.published_only)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM posts p WHERE {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.author_id)
            .bind(filter.published_only)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        let posts = rows.into_iter().map(map_row_to_post).collect();
        Ok(Page::new(posts, &page, total))
    }

    async fn search_published(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let pattern = contains_pattern(term);
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE {SEARCH}
            ORDER BY {}
            LIMIT $2
            OFFSET $3
            "#,
            page.sort.order_by(Some("p"))
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM posts p WHERE {SEARCH}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        let posts = rows.into_iter().map(map_row_to_post).collect();
        Ok(Page::new(posts, &page, total))
    }
}

fn map_row_to_post(row: PostRow) -> Post {
    Post {
        id: row.id,
        title: row.title,
        content: row.content,
        is_published: row.is_published,
        author_id: row.author_id,
        author_username: row.author_username,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn map_post_db_error(err: sqlx::Error, author_id: i64) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::not_found("user", author_id);
    }
    map_query_error(err)
}

fn map_query_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
