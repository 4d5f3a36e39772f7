use chrono::Utc;
use plaza_db::comments as comment_store;
use plaza_db::likes;
use plaza_db::posts as store;
use plaza_db::rusqlite::Connection;
use plaza_types::models::{Caller, Post, PostId};
use tracing::info;

use crate::Community;
use crate::error::{CommunityError, Result};
use crate::gate;

impl Community {
    pub fn create_post(&self, caller: &Caller, title: &str, contents: &str) -> Result<Post> {
        gate::ensure_active(caller)?;
        let title = gate::non_empty("title", title)?;
        let contents = gate::non_empty("contents", contents)?;
        let author_id = caller.user_id.to_string();

        let post = self.db().with_tx(|tx| {
            let id = store::insert_post(tx, &author_id, &title, &contents, Utc::now())?;
            load_post(tx, id)
        })?;

        info!("Post {} created by {}", post.id, caller.user_id);
        Ok(post)
    }

    /// Deletes a post together with all of its comments and every like on the
    /// post or its comments. Returns the number of comments removed.
    pub fn delete_post(&self, caller: &Caller, post_id: PostId) -> Result<u32> {
        gate::ensure_active(caller)?;

        let (comments, comment_likes, post_likes) = self.db().with_tx(|tx| {
            let post = load_post(tx, post_id)?;
            gate::ensure_owner_or_admin(caller, post.author_id, &format!("post {}", post_id))?;

            purge_post(tx, post_id)
        })?;

        info!(
            "Post {} deleted by {} ({} comments, {} comment likes, {} post likes removed)",
            post_id, caller.user_id, comments, comment_likes, post_likes
        );
        Ok(comments as u32)
    }
}

/// Removes a post with its comments and every like on either. Returns
/// (comments, comment likes, post likes) removed.
pub(crate) fn purge_post(tx: &Connection, post_id: PostId) -> Result<(usize, usize, usize)> {
    let comment_likes = likes::delete_comment_likes_of_post(tx, post_id)?;
    let comments = comment_store::delete_comments_of_post(tx, post_id)?;
    let post_likes = likes::delete_likes_of_post(tx, post_id)?;
    if !store::delete_post(tx, post_id)? {
        return Err(CommunityError::not_found(format!("post {}", post_id)));
    }
    Ok((comments, comment_likes, post_likes))
}

pub(crate) fn load_post(conn: &Connection, post_id: PostId) -> Result<Post> {
    let row = store::get_post(conn, post_id)?
        .ok_or_else(|| CommunityError::not_found(format!("post {}", post_id)))?;
    Ok(row.into_post()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommunityConfig;
    use plaza_db::Database;
    use plaza_types::models::Role;
    use std::sync::Arc;
    use uuid::Uuid;

    fn setup() -> (Community, Caller, Caller) {
        let c = Community::new(Arc::new(Database::open_in_memory().unwrap()), CommunityConfig::default());
        let mut users = Vec::new();
        for name in ["alice", "bob"] {
            let id = Uuid::new_v4();
            c.db()
                .create_user(&id.to_string(), &format!("{name}@example.com"), name, "hash", Role::User)
                .unwrap();
            users.push(c.resolve_caller(id).unwrap());
        }
        let bob = users.pop().unwrap();
        let alice = users.pop().unwrap();
        (c, alice, bob)
    }

    #[test]
    fn post_requires_title_and_contents() {
        let (c, alice, _) = setup();
        assert!(matches!(c.create_post(&alice, "", "body"), Err(CommunityError::InvalidInput(_))));
        assert!(matches!(c.create_post(&alice, "title", " "), Err(CommunityError::InvalidInput(_))));

        let post = c.create_post(&alice, "title", "body").unwrap();
        assert_eq!(post.author_id, alice.user_id);
        assert_eq!(post.comment_count, 0);
    }

    #[test]
    fn deleting_post_removes_its_whole_thread() {
        let (c, alice, bob) = setup();
        let post = c.create_post(&alice, "title", "body").unwrap();
        let top = c.create_top_level(&bob, post.id, "top").unwrap();
        let reply = c.create_reply(&alice, top.id, "reply").unwrap();
        c.like_comment(&alice, top.id).unwrap();
        c.like_comment(&bob, reply.id).unwrap();
        c.like_post(&bob, post.id).unwrap();
        assert_eq!(c.get_post(post.id).unwrap().comment_count, 2);

        assert!(matches!(c.delete_post(&bob, post.id), Err(CommunityError::Forbidden(_))));
        assert_eq!(c.delete_post(&alice, post.id).unwrap(), 2);

        assert!(matches!(c.get_post(post.id), Err(CommunityError::NotFound(_))));
        assert!(matches!(c.get_comment(reply.id), Err(CommunityError::NotFound(_))));
        assert!(!c.has_liked_comment(bob.user_id, reply.id).unwrap());
        assert!(matches!(c.delete_post(&alice, post.id), Err(CommunityError::NotFound(_))));
    }
}
