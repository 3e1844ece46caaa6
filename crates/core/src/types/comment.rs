//! Product comments and reply threading.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{CommentId, ProductId};

/// A comment left on a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub product_id: ProductId,
    /// Comment this one replies to, if any.
    pub parent_id: Option<CommentId>,
    pub email: Email,
    pub nickname: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment with its nested replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<CommentThread>,
}

/// Arrange a flat list of comments into reply threads.
///
/// Input order is kept among siblings. A comment whose parent is not in the
/// list, or that sits on a parent cycle, is treated as a top-level comment.
#[must_use]
pub fn build_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    let ids: HashSet<CommentId> = comments.iter().map(|c| c.id).collect();
    let parents: HashMap<CommentId, CommentId> = comments
        .iter()
        .filter_map(|c| c.parent_id.filter(|p| ids.contains(p)).map(|p| (c.id, p)))
        .collect();

    let mut roots = Vec::new();
    let mut children: HashMap<CommentId, Vec<Comment>> = HashMap::new();
    for comment in comments {
        match parents.get(&comment.id) {
            Some(&parent) if !on_parent_cycle(comment.id, &parents) => {
                children.entry(parent).or_default().push(comment);
            }
            _ => roots.push(comment),
        }
    }

    roots
        .into_iter()
        .map(|comment| attach_replies(comment, &mut children))
        .collect()
}

/// Whether following parents from `id` leads back to `id`.
fn on_parent_cycle(id: CommentId, parents: &HashMap<CommentId, CommentId>) -> bool {
    let mut seen = HashSet::new();
    let mut current = id;
    while let Some(&parent) = parents.get(&current) {
        if parent == id {
            return true;
        }
        if !seen.insert(parent) {
            return false;
        }
        current = parent;
    }
    false
}

fn attach_replies(
    comment: Comment,
    children: &mut HashMap<CommentId, Vec<Comment>>,
) -> CommentThread {
    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach_replies(reply, children))
        .collect();
    CommentThread { comment, replies }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn comment(id: i32, parent: Option<i32>) -> Comment {
        Comment {
            id: CommentId::new(id),
            product_id: ProductId::new(1),
            parent_id: parent.map(CommentId::new),
            email: Email::parse("client@boutique.fr").unwrap(),
            nickname: format!("user{id}"),
            content: format!("comment {id}"),
            created_at: Utc.timestamp_opt(1_657_800_000 + i64::from(id), 0).unwrap(),
        }
    }

    #[test]
    fn test_replies_nest_under_parents() {
        let threads = build_threads(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
            comment(4, Some(2)),
            comment(5, Some(1)),
        ]);

        assert_eq!(threads.len(), 2);
        let first = &threads[0];
        assert_eq!(first.comment.id, CommentId::new(1));
        let reply_ids: Vec<_> = first.replies.iter().map(|t| t.comment.id.as_i32()).collect();
        assert_eq!(reply_ids, vec![2, 5]);
        assert_eq!(first.replies[0].replies[0].comment.id, CommentId::new(4));
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn test_orphan_reply_becomes_top_level() {
        let threads = build_threads(vec![comment(7, Some(99)), comment(8, Some(8))]);
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|t| t.replies.is_empty()));
    }

    #[test]
    fn test_parent_cycle_is_promoted_to_top_level() {
        let threads = build_threads(vec![
            comment(1, Some(2)),
            comment(2, Some(1)),
            comment(3, Some(1)),
        ]);

        let root_ids: Vec<_> = threads.iter().map(|t| t.comment.id.as_i32()).collect();
        assert_eq!(root_ids, vec![1, 2]);
        assert_eq!(threads[0].replies.len(), 1);
        assert_eq!(threads[0].replies[0].comment.id, CommentId::new(3));
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn test_empty_list() {
        assert!(build_threads(Vec::new()).is_empty());
    }
}
