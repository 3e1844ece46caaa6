//! Product comments.
//!
//! Visitors can comment on a product page and reply to an existing comment.
//! A reply whose parent cannot be found on the same product is stored as a
//! top-level comment rather than rejected.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use boutique_core::{Comment, CommentId, Email, EmailError, ProductId};

use crate::db::RepositoryError;

/// Longest accepted nickname, in characters.
pub const MAX_NICKNAME_CHARS: usize = 150;

/// Reasons a submitted comment is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("nickname is required")]
    MissingNickname,
    #[error("nickname must be at most {MAX_NICKNAME_CHARS} characters")]
    NicknameTooLong,
    #[error("comment cannot be empty")]
    EmptyContent,
    #[error("consent to store personal data is required")]
    MissingConsent,
    #[error("invalid parent comment id")]
    InvalidParent,
}

/// Comment form as posted by the product page.
#[derive(Debug, Deserialize)]
pub struct NewCommentForm {
    pub email: String,
    pub nickname: String,
    pub content: String,
    /// Checkbox; present (any value) when ticked.
    pub rgpd: Option<String>,
    /// Hidden field; empty for a top-level comment.
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// A validated comment ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub product_id: ProductId,
    pub parent_id: Option<CommentId>,
    pub email: Email,
    pub nickname: String,
    pub content: String,
}

impl NewCommentForm {
    /// Validate the form for `product_id`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommentError`] found.
    pub fn validate(self, product_id: ProductId) -> Result<NewComment, CommentError> {
        let email = Email::parse(&self.email)?;

        let nickname = self.nickname.trim();
        if nickname.is_empty() {
            return Err(CommentError::MissingNickname);
        }
        if nickname.chars().count() > MAX_NICKNAME_CHARS {
            return Err(CommentError::NicknameTooLong);
        }

        let content = self.content.trim();
        if content.is_empty() {
            return Err(CommentError::EmptyContent);
        }

        if self.rgpd.is_none() {
            return Err(CommentError::MissingConsent);
        }

        let parent_id = match self.parent_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(CommentId::new(
                raw.parse().map_err(|_| CommentError::InvalidParent)?,
            )),
        };

        Ok(NewComment {
            product_id,
            parent_id,
            email,
            nickname: nickname.to_string(),
            content: content.to_string(),
        })
    }
}

/// Storage for product comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments on a product, oldest first.
    async fn list_for_product(&self, product_id: ProductId)
    -> Result<Vec<Comment>, RepositoryError>;

    /// Store a comment.
    ///
    /// A `parent_id` that does not name a comment on the same product is
    /// dropped and the comment is stored at top level.
    async fn create(&self, comment: NewComment) -> Result<Comment, RepositoryError>;
}

/// Comments kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryCommentRepository {
    comments: Mutex<Vec<Comment>>,
}

impl InMemoryCommentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Comment>> {
        self.comments
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        Ok(self
            .lock()
            .iter()
            .filter(|c| c.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, RepositoryError> {
        let mut comments = self.lock();

        let parent_id = comment.parent_id.filter(|parent| {
            comments
                .iter()
                .any(|c| c.id == *parent && c.product_id == comment.product_id)
        });
        let next_id = comments.iter().map(|c| c.id.as_i32()).max().unwrap_or(0) + 1;

        let stored = Comment {
            id: CommentId::new(next_id),
            product_id: comment.product_id,
            parent_id,
            email: comment.email,
            nickname: comment.nickname,
            content: comment.content,
            created_at: Utc::now(),
        };
        comments.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> NewCommentForm {
        NewCommentForm {
            email: "client@boutique.fr".to_string(),
            nickname: "  Camille ".to_string(),
            content: "Très belle tasse".to_string(),
            rgpd: Some("on".to_string()),
            parent_id: Some(String::new()),
        }
    }

    #[test]
    fn test_validate_trims_and_accepts() {
        let comment = form().validate(ProductId::new(1)).unwrap();
        assert_eq!(comment.nickname, "Camille");
        assert_eq!(comment.parent_id, None);
        assert_eq!(comment.product_id, ProductId::new(1));
    }

    #[test]
    fn test_validate_parses_parent() {
        let mut f = form();
        f.parent_id = Some("12".to_string());
        assert_eq!(
            f.validate(ProductId::new(1)).unwrap().parent_id,
            Some(CommentId::new(12))
        );

        let mut f = form();
        f.parent_id = Some("abc".to_string());
        assert_eq!(
            f.validate(ProductId::new(1)),
            Err(CommentError::InvalidParent)
        );
    }

    #[test]
    fn test_validate_rejections() {
        let mut f = form();
        f.rgpd = None;
        assert_eq!(
            f.validate(ProductId::new(1)),
            Err(CommentError::MissingConsent)
        );

        let mut f = form();
        f.content = "   ".to_string();
        assert_eq!(f.validate(ProductId::new(1)), Err(CommentError::EmptyContent));

        let mut f = form();
        f.nickname = String::new();
        assert_eq!(
            f.validate(ProductId::new(1)),
            Err(CommentError::MissingNickname)
        );

        let mut f = form();
        f.nickname = "x".repeat(MAX_NICKNAME_CHARS + 1);
        assert_eq!(
            f.validate(ProductId::new(1)),
            Err(CommentError::NicknameTooLong)
        );

        let mut f = form();
        f.email = "nope".to_string();
        assert!(matches!(
            f.validate(ProductId::new(1)),
            Err(CommentError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_reply_to_other_product_becomes_top_level() {
        let repo = InMemoryCommentRepository::new();
        let first = repo
            .create(form().validate(ProductId::new(1)).unwrap())
            .await
            .unwrap();

        let mut reply = form().validate(ProductId::new(1)).unwrap();
        reply.parent_id = Some(first.id);
        let reply = repo.create(reply).await.unwrap();
        assert_eq!(reply.parent_id, Some(first.id));

        let mut elsewhere = form().validate(ProductId::new(2)).unwrap();
        elsewhere.parent_id = Some(first.id);
        let elsewhere = repo.create(elsewhere).await.unwrap();
        assert_eq!(elsewhere.parent_id, None);

        assert_eq!(repo.list_for_product(ProductId::new(1)).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_product(ProductId::new(2)).await.unwrap().len(), 1);
    }
}
