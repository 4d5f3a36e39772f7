use plaza_types::paging::SortOrder;

/// Policy toggles for the community subsystem.
#[derive(Debug, Clone)]
pub struct CommunityConfig {
    /// Whether a user may like their own comment. Post likes never allow it.
    pub allow_self_like: bool,
    /// Whether admins may edit comments written by other users.
    pub admin_can_edit: bool,
    pub max_page_size: u32,
    pub comment_order: SortOrder,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            allow_self_like: true,
            admin_can_edit: false,
            max_page_size: 100,
            comment_order: SortOrder::Oldest,
        }
    }
}
