//! Comment repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use boutique_core::{Comment, CommentId, Email, ProductId};

use super::RepositoryError;
use crate::comments::{CommentRepository, NewComment};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: CommentId,
    product_id: ProductId,
    parent_id: Option<CommentId>,
    email: String,
    nickname: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = RepositoryError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            parent_id: row.parent_id,
            email,
            nickname: row.nickname,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

/// Comments stored in the `comments` table.
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r"
            SELECT id, product_id, parent_id, email, nickname, content, created_at
            FROM comments
            WHERE product_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let parent_id = match comment.parent_id {
            Some(parent) => {
                sqlx::query_scalar::<_, CommentId>(
                    "SELECT id FROM comments WHERE id = $1 AND product_id = $2",
                )
                .bind(parent)
                .bind(comment.product_id)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => None,
        };

        let row = sqlx::query_as::<_, CommentRow>(
            r"
            INSERT INTO comments (product_id, parent_id, email, nickname, content, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, product_id, parent_id, email, nickname, content, created_at
            ",
        )
        .bind(comment.product_id)
        .bind(parent_id)
        .bind(comment.email.as_str())
        .bind(&comment.nickname)
        .bind(&comment.content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Comment::try_from(row)
    }
}
