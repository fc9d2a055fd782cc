use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::pkg::internal::adaptors::profiles::spec::AuthorSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LikeEntry {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

/// A post row joined with its author's profile.
#[derive(FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_full_name: String,
    pub author_title: Option<String>,
    pub author_avatar_url: Option<String>,
}

/// A comment row joined with its author's profile.
#[derive(FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_full_name: String,
    pub author_title: Option<String>,
    pub author_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        CommentView {
            id: row.id,
            post_id: row.post_id,
            content: row.content,
            created_at: row.created_at,
            author: AuthorSummary {
                id: row.user_id,
                full_name: row.author_full_name,
                title: row.author_title,
                avatar_url: row.author_avatar_url,
            },
        }
    }
}

/// A post as the feed shows it to one viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
    pub likes: Vec<LikeEntry>,
    pub comments: Vec<CommentView>,
    pub viewer_liked: bool,
}

impl FeedPost {
    pub fn assemble(
        row: PostRow,
        likes: Vec<LikeEntry>,
        comments: Vec<CommentView>,
        viewer: &Uuid,
    ) -> Self {
        let viewer_liked = likes.iter().any(|l| &l.user_id == viewer);
        FeedPost {
            id: row.id,
            content: row.content,
            image_url: row.image_url,
            created_at: row.created_at,
            author: AuthorSummary {
                id: row.user_id,
                full_name: row.author_full_name,
                title: row.author_title,
                avatar_url: row.author_avatar_url,
            },
            likes,
            comments,
            viewer_liked,
        }
    }

    pub fn liked_by(&self, user_id: &Uuid) -> bool {
        self.likes.iter().any(|l| &l.user_id == user_id)
    }

    /// Makes `user_id`'s like present or absent, keeping at most one per user.
    pub fn apply_like(&mut self, user_id: &Uuid, liked: bool) {
        self.likes.retain(|l| &l.user_id != user_id);
        if liked {
            self.likes.push(LikeEntry {
                post_id: self.id,
                user_id: *user_id,
            });
        }
        self.viewer_liked = liked;
    }
}

/// Content must survive trimming unless an image carries the post.
pub fn post_content(content: &str, has_image: bool) -> Option<String> {
    let content = content.trim();
    if content.is_empty() && !has_image {
        None
    } else {
        Some(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_for(likes: Vec<LikeEntry>, viewer: &Uuid) -> FeedPost {
        let id = Uuid::new_v4();
        FeedPost::assemble(
            PostRow {
                id,
                user_id: Uuid::new_v4(),
                content: "new pavilion sketches".into(),
                image_url: None,
                created_at: Utc::now(),
                author_full_name: "Alvar Aalto".into(),
                author_title: Some("Architect".into()),
                author_avatar_url: None,
            },
            likes,
            vec![],
            viewer,
        )
    }

    fn post(likes: Vec<LikeEntry>) -> FeedPost {
        post_for(likes, &Uuid::nil())
    }

    fn flip(p: &mut FeedPost, user_id: &Uuid) -> bool {
        let liked = !p.liked_by(user_id);
        p.apply_like(user_id, liked);
        liked
    }

    #[test]
    fn test_toggling_twice_restores_likes() {
        let me = Uuid::new_v4();
        let other = LikeEntry {
            post_id: Uuid::nil(),
            user_id: Uuid::new_v4(),
        };
        let mut p = post(vec![other.clone()]);
        let before = p.likes.clone();

        assert!(flip(&mut p, &me));
        assert_eq!(p.likes.len(), 2);
        assert!(p.viewer_liked);

        assert!(!flip(&mut p, &me));
        assert_eq!(p.likes, before);
        assert!(!p.viewer_liked);
    }

    #[test]
    fn test_toggle_from_liked_state_round_trips() {
        let me = Uuid::new_v4();
        let mut p = post(vec![]);
        p.apply_like(&me, true);
        let before = p.likes.clone();
        flip(&mut p, &me);
        flip(&mut p, &me);
        assert_eq!(p.likes, before);
        assert!(p.liked_by(&me));
    }

    #[test]
    fn test_apply_like_never_duplicates() {
        let me = Uuid::new_v4();
        let mut p = post(vec![]);
        p.apply_like(&me, true);
        p.apply_like(&me, true);
        assert_eq!(p.likes.len(), 1);
        p.apply_like(&me, false);
        p.apply_like(&me, false);
        assert!(p.likes.is_empty());
        assert!(!p.viewer_liked);
    }

    #[test]
    fn test_viewer_flag_follows_assembled_likes() {
        let me = Uuid::new_v4();
        let likes = vec![LikeEntry {
            post_id: Uuid::nil(),
            user_id: me,
        }];
        assert!(post_for(likes.clone(), &me).viewer_liked);
        let seen_by_other = post(likes);
        assert!(!seen_by_other.viewer_liked);
        assert!(seen_by_other.liked_by(&me));
    }

    #[test]
    fn test_empty_post_without_image_is_rejected() {
        assert_eq!(post_content("   \n\t", false), None);
        assert_eq!(post_content("", true).as_deref(), Some(""));
        assert_eq!(
            post_content("  courtyard study  ", false).as_deref(),
            Some("courtyard study")
        );
    }
}
