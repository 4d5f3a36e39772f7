use plaza_db::comments as comment_store;
use plaza_db::likes;
use plaza_db::models::UserRow;
use plaza_db::posts as post_store;
use plaza_db::queries;
use plaza_types::api::{UserSummary, WithdrawUserResponse};
use plaza_types::models::{Caller, CommentKind};
use plaza_types::paging::{Page, PageRequest};
use tracing::info;
use uuid::Uuid;

use crate::Community;
use crate::comment_tree::{cascade_top_level, delete_reply};
use crate::error::{CommunityError, Result};
use crate::gate;
use crate::paging::{paginate, validate};
use crate::posts::purge_post;

impl Community {
    /// Bans or unbans a user. Admin only; admins cannot restrict themselves.
    pub fn set_restricted(&self, caller: &Caller, user_id: Uuid, restricted: bool) -> Result<UserSummary> {
        gate::ensure_admin(caller)?;
        if caller.user_id == user_id {
            return Err(CommunityError::invalid_input("cannot change your own restriction"));
        }
        let id = user_id.to_string();

        let user = self.db().with_tx(|tx| {
            if !queries::set_user_restricted(tx, &id, restricted)? {
                return Err(CommunityError::not_found(format!("user {}", user_id)));
            }
            let row = queries::query_user_by_id(tx, &id)?
                .ok_or_else(|| CommunityError::not_found(format!("user {}", user_id)))?;
            Ok(row.into_user()?)
        })?;

        info!("User {} restricted={} by admin {}", user_id, restricted, caller.user_id);
        Ok(UserSummary::from(user))
    }

    pub fn list_restricted_users(&self, caller: &Caller, request: PageRequest) -> Result<Page<UserSummary>> {
        gate::ensure_admin(caller)?;
        validate(request, self.config().max_page_size)?;

        self.db().with_snapshot(|conn| {
            let total = queries::count_restricted_users(conn)?;
            paginate(
                total,
                request,
                |limit, offset| queries::list_restricted_users(conn, limit, offset),
                |row: UserRow| Ok(UserSummary::from(row.into_user()?)),
            )
        })
    }

    /// Every account, oldest first. Admin only.
    pub fn list_users(&self, caller: &Caller, request: PageRequest) -> Result<Page<UserSummary>> {
        gate::ensure_admin(caller)?;
        validate(request, self.config().max_page_size)?;

        self.db().with_snapshot(|conn| {
            let total = queries::count_users(conn)?;
            paginate(
                total,
                request,
                |limit, offset| queries::list_users(conn, limit, offset),
                |row: UserRow| Ok(UserSummary::from(row.into_user()?)),
            )
        })
    }

    /// Force-removes an account with everything it owns, in one transaction.
    ///
    /// Likes the user gave are taken back and their targets' `like_count`
    /// decremented. The user's posts go with their whole threads. Their other
    /// comments are deleted like `delete_comment` would: a reply decrements its
    /// parent, a top-level comment takes its replies along. Post
    /// `comment_count`s follow every removal.
    pub fn withdraw_user(&self, caller: &Caller, user_id: Uuid) -> Result<WithdrawUserResponse> {
        gate::ensure_admin(caller)?;
        if caller.user_id == user_id {
            return Err(CommunityError::invalid_input("cannot withdraw your own account"));
        }
        let id = user_id.to_string();

        let summary = self.db().with_tx(|tx| {
            if queries::query_user_by_id(tx, &id)?.is_none() {
                return Err(CommunityError::not_found(format!("user {}", user_id)));
            }

            for comment_id in likes::comments_liked_by(tx, &id)? {
                comment_store::bump_like_count(tx, comment_id, -1)?;
            }
            let mut deleted_likes = likes::delete_comment_likes_by(tx, &id)?;
            for post_id in likes::posts_liked_by(tx, &id)? {
                post_store::bump_post_like_count(tx, post_id, -1)?;
            }
            deleted_likes += likes::delete_post_likes_by(tx, &id)?;

            let mut deleted_comments = 0;
            let post_ids = post_store::post_ids_by_author(tx, &id)?;
            for post_id in &post_ids {
                let (comments, comment_likes, post_likes) = purge_post(tx, *post_id)?;
                deleted_comments += comments;
                deleted_likes += comment_likes + post_likes;
            }

            // Replies come first, so a top-level cascade never meets one of them.
            for row in comment_store::find_comments_by_author(tx, &id)? {
                let comment = row.into_comment()?;
                let (replies, comment_likes) = match comment.kind {
                    CommentKind::TopLevel => cascade_top_level(tx, &comment)?,
                    CommentKind::Reply { parent_id } => delete_reply(tx, &comment, parent_id)?,
                };
                deleted_comments += replies as usize + 1;
                deleted_likes += comment_likes;
            }

            if !queries::delete_user(tx, &id)? {
                return Err(CommunityError::not_found(format!("user {}", user_id)));
            }

            Ok(WithdrawUserResponse {
                user_id,
                deleted_posts: post_ids.len() as u32,
                deleted_comments: deleted_comments as u32,
                deleted_likes: deleted_likes as u32,
            })
        })?;

        info!(
            "User {} withdrawn by admin {} ({} posts, {} comments, {} likes removed)",
            user_id, caller.user_id, summary.deleted_posts, summary.deleted_comments, summary.deleted_likes
        );
        Ok(summary)
    }
}
