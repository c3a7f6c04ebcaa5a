use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::contains_pattern;
use crate::data::comment_repository::{CommentFilter, CommentRepository, NewComment};
use crate::data::pagination::{Page, PageRequest};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

const COMMENT_COLUMNS: &str = "c.id, c.content, c.post_id, c.author_id, \
     u.username AS author_username, c.created_at, c.updated_at";

const FILTER: &str =
    "($1::BIGINT IS NULL OR c.post_id = $1) AND ($2::BIGINT IS NULL OR c.author_id = $2)";

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    post_id: i64,
    author_id: i64,
    author_username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (content, post_id, author_id)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            JOIN users u ON u.id = c.author_id
            "#
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(&input.content)
            .bind(input.post_id)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_insert_error(err, &input))?;

        Ok(map_row_to_comment(row))
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id WHERE c.id = $1"
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(map_row_to_comment))
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Option<Comment>, DomainError> {
        let sql = format!(
            r#"
            WITH c AS (
                UPDATE comments
                SET content = $2,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            JOIN users u ON u.id = c.author_id
            "#
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(comment.id)
            .bind(&comment.content)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(map_row_to_comment))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(
        &self,
        filter: CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE {FILTER}
            ORDER BY {}
            LIMIT $3
            OFFSET $4
            "#,
            page.sort.order_by(Some("c"))
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(filter.post_id)
            .bind(filter.author_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        let count_sql = format!("SELECT COUNT(*) FROM comments c WHERE {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.post_id)
            .bind(filter.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        let comments = rows.into_iter().map(map_row_to_comment).collect();
        Ok(Page::new(comments, &page, total))
    }

    async fn search_comments(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let pattern = contains_pattern(term);
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.content ILIKE $1
            ORDER BY {}
            LIMIT $2
            OFFSET $3
            "#,
            page.sort.order_by(Some("c"))
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments c WHERE c.content ILIKE $1")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await
                .map_err(map_query_error)?;

        let comments = rows.into_iter().map(map_row_to_comment).collect();
        Ok(Page::new(comments, &page, total))
    }
}

fn map_row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        content: row.content,
        post_id: row.post_id,
        author_id: row.author_id,
        author_username: row.author_username,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn map_insert_error(err: sqlx::Error, input: &NewComment) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return match db_err.constraint() {
            Some("comments_author_id_fkey") => DomainError::not_found("user", input.author_id),
            _ => DomainError::not_found("post", input.post_id),
        };
    }
    map_query_error(err)
}

fn map_query_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
