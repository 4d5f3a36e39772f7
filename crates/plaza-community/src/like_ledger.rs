//! Like ledger: one like per (user, target), with the target's `like_count`
//! moved in the same transaction as the like row.

use chrono::Utc;
use plaza_db::comments as comment_store;
use plaza_db::likes;
use plaza_db::posts as post_store;
use plaza_types::models::{Caller, CommentId, PostId};
use tracing::{info, warn};

use crate::Community;
use crate::comment_tree::load_comment;
use crate::error::{CommunityError, Result};
use crate::gate;
use crate::posts::load_post;

impl Community {
    /// Likes a comment and returns its new `like_count`.
    pub fn like_comment(&self, caller: &Caller, comment_id: CommentId) -> Result<u32> {
        gate::ensure_active(caller)?;
        let user_id = caller.user_id.to_string();
        let allow_self_like = self.config().allow_self_like;

        let like_count = self.db().with_tx(|tx| {
            let comment = load_comment(tx, comment_id)?;
            if !allow_self_like && comment.author_id == caller.user_id {
                return Err(CommunityError::forbidden("cannot like your own comment"));
            }
            if likes::exists_comment_like(tx, &user_id, comment_id)? {
                return Err(CommunityError::conflict("already liked"));
            }
            if !likes::insert_comment_like(tx, &user_id, comment_id, Utc::now())? {
                return Err(CommunityError::conflict("already liked"));
            }

            comment_store::bump_like_count(tx, comment_id, 1)?
                .ok_or_else(|| CommunityError::not_found(format!("comment {}", comment_id)))
        })?;

        info!("User {} liked comment {} (now {})", caller.user_id, comment_id, like_count);
        Ok(like_count as u32)
    }

    /// Removes the caller's like from a comment and returns its new `like_count`.
    pub fn unlike_comment(&self, caller: &Caller, comment_id: CommentId) -> Result<u32> {
        let user_id = caller.user_id.to_string();

        let like_count = self.db().with_tx(|tx| {
            let comment = load_comment(tx, comment_id)?;
            if !likes::delete_comment_like(tx, &user_id, comment_id)? {
                return Err(CommunityError::not_found("like"));
            }
            if comment.like_count == 0 {
                warn!("like_count of comment {} already 0 while removing a like", comment_id);
            }

            comment_store::bump_like_count(tx, comment_id, -1)?
                .ok_or_else(|| CommunityError::not_found(format!("comment {}", comment_id)))
        })?;

        info!("User {} unliked comment {} (now {})", caller.user_id, comment_id, like_count);
        Ok(like_count as u32)
    }

    /// Whether the given user currently likes the comment.
    pub fn has_liked_comment(&self, user_id: uuid::Uuid, comment_id: CommentId) -> Result<bool> {
        let liked = self
            .db()
            .with_conn(|conn| likes::exists_comment_like(conn, &user_id.to_string(), comment_id))?;
        Ok(liked)
    }

    /// Likes a post. Unlike comments, a post can never be liked by its author.
    pub fn like_post(&self, caller: &Caller, post_id: PostId) -> Result<u32> {
        gate::ensure_active(caller)?;
        let user_id = caller.user_id.to_string();

        let like_count = self.db().with_tx(|tx| {
            let post = load_post(tx, post_id)?;
            if post.author_id == caller.user_id {
                return Err(CommunityError::forbidden("cannot like your own post"));
            }
            if likes::exists_post_like(tx, &user_id, post_id)? {
                return Err(CommunityError::conflict("already liked"));
            }
            if !likes::insert_post_like(tx, &user_id, post_id, Utc::now())? {
                return Err(CommunityError::conflict("already liked"));
            }

            post_store::bump_post_like_count(tx, post_id, 1)?
                .ok_or_else(|| CommunityError::not_found(format!("post {}", post_id)))
        })?;

        info!("User {} liked post {} (now {})", caller.user_id, post_id, like_count);
        Ok(like_count as u32)
    }

    pub fn unlike_post(&self, caller: &Caller, post_id: PostId) -> Result<u32> {
        let user_id = caller.user_id.to_string();

        let like_count = self.db().with_tx(|tx| {
            let post = load_post(tx, post_id)?;
            if !likes::delete_post_like(tx, &user_id, post_id)? {
                return Err(CommunityError::not_found("like"));
            }
            if post.like_count == 0 {
                warn!("like_count of post {} already 0 while removing a like", post_id);
            }

            post_store::bump_post_like_count(tx, post_id, -1)?
                .ok_or_else(|| CommunityError::not_found(format!("post {}", post_id)))
        })?;

        info!("User {} unliked post {} (now {})", caller.user_id, post_id, like_count);
        Ok(like_count as u32)
    }
}
