//! Paged read paths. Each page is counted and fetched inside one read
//! transaction so the totals describe exactly the rows returned.

use plaza_db::comments as comment_store;
use plaza_db::models::{CommentRow, PostRow};
use plaza_db::posts as post_store;
use plaza_types::api::{CommentResponse, PostResponse};
use plaza_types::models::{CommentId, PostId};
use plaza_types::paging::{Page, PageRequest};
use tracing::debug;

use crate::Community;
use crate::comment_tree::load_comment;
use crate::error::{CommunityError, Result};
use crate::paging::{paginate, validate};

impl Community {
    /// Top-level comments of a post in the configured order.
    pub fn list_comments(&self, post_id: PostId, request: PageRequest) -> Result<Page<CommentResponse>> {
        validate(request, self.config().max_page_size)?;
        let order = self.config().comment_order;

        let page = self.db().with_snapshot(|conn| {
            if !post_store::post_exists(conn, post_id)? {
                return Err(CommunityError::not_found(format!("post {}", post_id)));
            }
            let total = comment_store::count_top_level(conn, post_id)?;
            paginate(
                total,
                request,
                |limit, offset| comment_store::list_top_level(conn, post_id, order, limit, offset),
                comment_response,
            )
        })?;

        debug!(
            "Listed {} of {} comments on post {}",
            page.page_info.current_size, page.page_info.total_size, post_id
        );
        Ok(page)
    }

    /// Replies under a comment in the configured order. A reply has no
    /// replies, so listing under one yields an empty page.
    pub fn list_replies(&self, parent_id: CommentId, request: PageRequest) -> Result<Page<CommentResponse>> {
        validate(request, self.config().max_page_size)?;
        let order = self.config().comment_order;

        let page = self.db().with_snapshot(|conn| {
            load_comment(conn, parent_id)?;
            let total = comment_store::count_replies(conn, parent_id)?;
            paginate(
                total,
                request,
                |limit, offset| comment_store::list_replies(conn, parent_id, order, limit, offset),
                comment_response,
            )
        })?;

        debug!(
            "Listed {} of {} replies under comment {}",
            page.page_info.current_size, page.page_info.total_size, parent_id
        );
        Ok(page)
    }

    /// A single comment with its author name, as returned after an edit.
    pub fn comment_view(&self, comment_id: CommentId) -> Result<CommentResponse> {
        self.db().with_conn(|conn| {
            let row = comment_store::get_comment(conn, comment_id)?
                .ok_or_else(|| CommunityError::not_found(format!("comment {}", comment_id)))?;
            Ok(comment_response(row)?)
        })
    }

    pub fn get_post(&self, post_id: PostId) -> Result<PostResponse> {
        self.db().with_conn(|conn| {
            let row = post_store::get_post(conn, post_id)?
                .ok_or_else(|| CommunityError::not_found(format!("post {}", post_id)))?;
            Ok(post_response(row)?)
        })
    }

    /// All posts, newest first.
    pub fn list_posts(&self, request: PageRequest) -> Result<Page<PostResponse>> {
        validate(request, self.config().max_page_size)?;

        self.db().with_snapshot(|conn| {
            let total = post_store::count_posts(conn)?;
            paginate(
                total,
                request,
                |limit, offset| post_store::list_posts(conn, limit, offset),
                post_response,
            )
        })
    }
}

fn comment_response(row: CommentRow) -> anyhow::Result<CommentResponse> {
    let username = row.author_username.clone();
    Ok(CommentResponse::new(row.into_comment()?, username))
}

fn post_response(row: PostRow) -> anyhow::Result<PostResponse> {
    let username = row.author_username.clone();
    Ok(PostResponse::new(row.into_post()?, username))
}
