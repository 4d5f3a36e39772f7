//! Threaded comments, likes and the paged read paths over them.
//!
//! Every mutation runs inside one store transaction: the row change and the
//! denormalized counters it affects (`like_count`, `replies_count`,
//! `comment_count`) commit together or not at all.

pub mod accounts;
pub mod comment_tree;
pub mod config;
pub mod error;
pub mod gate;
pub mod like_ledger;
pub mod listing;
pub mod moderation;
pub mod paging;
pub mod posts;

use std::sync::Arc;

use plaza_db::Database;
use plaza_types::models::Caller;
use uuid::Uuid;

pub use config::CommunityConfig;
pub use error::{CommunityError, ErrorKind, Result};

/// Entry point for every community operation. Cheap to clone.
#[derive(Clone)]
pub struct Community {
    db: Arc<Database>,
    config: Arc<CommunityConfig>,
}

impl Community {
    pub fn new(db: Arc<Database>, config: CommunityConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &CommunityConfig {
        &self.config
    }

    pub fn resolve_caller(&self, user_id: Uuid) -> Result<Caller> {
        gate::resolve_caller(&self.db, user_id)
    }
}
