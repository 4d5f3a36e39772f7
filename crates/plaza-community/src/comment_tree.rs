//! Comment tree manager: creation, editing and cascading deletion of
//! top-level comments and their replies.
//!
//! Threads are two levels deep. A reply points at a top-level comment and can
//! never have replies of its own. The parent's `replies_count` and the post's
//! `comment_count` are adjusted in the same transaction as the row they count.

use chrono::Utc;
use plaza_db::comments as store;
use plaza_db::likes;
use plaza_db::posts;
use plaza_db::rusqlite::Connection;
use plaza_types::models::{Caller, Comment, CommentId, CommentKind, PostId};
use tracing::{info, warn};

use crate::Community;
use crate::error::{CommunityError, Result};
use crate::gate;

impl Community {
    /// Adds a top-level comment to a post.
    pub fn create_top_level(&self, caller: &Caller, post_id: PostId, contents: &str) -> Result<Comment> {
        gate::ensure_active(caller)?;
        let contents = gate::non_empty("contents", contents)?;
        let author_id = caller.user_id.to_string();

        let comment = self.db().with_tx(|tx| {
            if !posts::post_exists(tx, post_id)? {
                return Err(CommunityError::not_found(format!("post {}", post_id)));
            }

            let id = store::insert_comment(tx, post_id, None, &author_id, &contents, Utc::now())?;
            posts::bump_post_comment_count(tx, post_id, 1)?;
            load_comment(tx, id)
        })?;

        info!("Comment {} created on post {} by {}", comment.id, post_id, caller.user_id);
        Ok(comment)
    }

    /// Adds a reply under a top-level comment and bumps the parent's
    /// `replies_count`. Replying to a reply fails with `InvalidState`.
    pub fn create_reply(&self, caller: &Caller, parent_id: CommentId, contents: &str) -> Result<Comment> {
        gate::ensure_active(caller)?;
        let contents = gate::non_empty("contents", contents)?;
        let author_id = caller.user_id.to_string();

        let reply = self.db().with_tx(|tx| {
            let parent = load_comment(tx, parent_id)
                .map_err(|e| rename_not_found(e, format!("parent comment {}", parent_id)))?;
            if !parent.is_top_level() {
                warn!("Rejected reply to reply {} by {}", parent_id, caller.user_id);
                return Err(CommunityError::invalid_state(format!(
                    "nesting depth exceeded: comment {} is already a reply",
                    parent_id
                )));
            }

            let id = store::insert_comment(
                tx,
                parent.post_id,
                Some(parent.id),
                &author_id,
                &contents,
                Utc::now(),
            )?;
            store::bump_replies_count(tx, parent.id, 1)?
                .ok_or_else(|| CommunityError::not_found(format!("parent comment {}", parent_id)))?;
            posts::bump_post_comment_count(tx, parent.post_id, 1)?;
            load_comment(tx, id)
        })?;

        info!("Reply {} created under comment {} by {}", reply.id, parent_id, caller.user_id);
        Ok(reply)
    }

    /// Replaces the contents of a comment or reply. Counters and children are
    /// left untouched.
    pub fn update_comment(&self, caller: &Caller, comment_id: CommentId, contents: &str) -> Result<Comment> {
        gate::ensure_active(caller)?;
        let contents = gate::non_empty("contents", contents)?;
        let admin_can_edit = self.config().admin_can_edit;

        let comment = self.db().with_tx(|tx| {
            let comment = load_comment(tx, comment_id)?;
            let may_edit =
                comment.author_id == caller.user_id || (caller.is_admin && admin_can_edit);
            if !may_edit {
                warn!("User {} may not edit comment {}", caller.user_id, comment_id);
                return Err(CommunityError::forbidden("only the author may edit this comment"));
            }

            store::update_contents(tx, comment_id, &contents)?;
            load_comment(tx, comment_id)
        })?;

        info!("Comment {} updated by {}", comment_id, caller.user_id);
        Ok(comment)
    }

    /// Deletes a comment as one unit and returns how many replies went with it.
    ///
    /// A top-level comment takes its replies and every like on any of them
    /// along. A reply takes only its own likes and decrements its parent's
    /// `replies_count` (floored at zero); it reports 0.
    pub fn delete_comment(&self, caller: &Caller, comment_id: CommentId) -> Result<u32> {
        gate::ensure_active(caller)?;

        let (deleted_replies, removed_likes) = self.db().with_tx(|tx| {
            let target = load_comment(tx, comment_id)?;
            gate::ensure_owner_or_admin(caller, target.author_id, &format!("comment {}", comment_id))?;

            match target.kind {
                CommentKind::TopLevel => cascade_top_level(tx, &target),
                CommentKind::Reply { parent_id } => delete_reply(tx, &target, parent_id),
            }
        })?;

        info!(
            "Comment {} deleted by {} ({} replies, {} likes removed)",
            comment_id, caller.user_id, deleted_replies, removed_likes
        );
        Ok(deleted_replies)
    }

    pub fn get_comment(&self, comment_id: CommentId) -> Result<Comment> {
        self.db().with_conn(|conn| load_comment(conn, comment_id))
    }
}

/// Returns (replies deleted, likes deleted).
pub(crate) fn cascade_top_level(tx: &Connection, target: &Comment) -> Result<(u32, usize)> {
    let replies = store::find_replies_of(tx, target.id)?;

    let mut removed_likes = likes::delete_likes_of_replies(tx, target.id)?;
    removed_likes += likes::delete_likes_of_comment(tx, target.id)?;

    let deleted = store::delete_replies_of(tx, target.id)?;
    if deleted != replies.len() {
        // Cannot happen under the write lock; refuse to commit a miscount.
        return Err(anyhow::anyhow!(
            "comment {}: gathered {} replies but deleted {}",
            target.id,
            replies.len(),
            deleted
        )
        .into());
    }

    if !store::delete_comment(tx, target.id)? {
        return Err(CommunityError::not_found(format!("comment {}", target.id)));
    }
    posts::bump_post_comment_count(tx, target.post_id, -(deleted as i64 + 1))?;

    Ok((deleted as u32, removed_likes))
}

pub(crate) fn delete_reply(tx: &Connection, target: &Comment, parent_id: CommentId) -> Result<(u32, usize)> {
    let removed_likes = likes::delete_likes_of_comment(tx, target.id)?;
    if !store::delete_comment(tx, target.id)? {
        return Err(CommunityError::not_found(format!("comment {}", target.id)));
    }

    let parent = load_comment(tx, parent_id)
        .map_err(|e| rename_not_found(e, format!("parent comment {}", parent_id)))?;
    if parent.replies_count == 0 {
        warn!("replies_count of comment {} already 0 while deleting reply {}", parent_id, target.id);
    }
    store::bump_replies_count(tx, parent_id, -1)?;
    posts::bump_post_comment_count(tx, target.post_id, -1)?;

    Ok((0, removed_likes))
}

pub(crate) fn load_comment(conn: &Connection, comment_id: CommentId) -> Result<Comment> {
    let row = store::get_comment(conn, comment_id)?
        .ok_or_else(|| CommunityError::not_found(format!("comment {}", comment_id)))?;
    Ok(row.into_comment()?)
}

fn rename_not_found(err: CommunityError, what: String) -> CommunityError {
    match err {
        CommunityError::NotFound(_) => CommunityError::NotFound(what),
        other => other,
    }
}
