pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod catalog_service;
pub(crate) mod comment_service;
pub(crate) mod profile_service;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BlogSettings {
    pub(crate) posts_per_page: u32,
    /// Refuse new comments on posts with `is_published = false`.
    pub(crate) comments_require_published_post: bool,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            posts_per_page: 10,
            comments_require_published_post: true,
        }
    }
}

/// A post or comment the viewer was checked to own. Only the services in
/// this module hand these out, so an edit cannot skip the ownership check.
#[derive(Debug, Clone)]
pub(crate) struct Owned<T> {
    target: T,
    owner_id: i64,
}

impl<T> Owned<T> {
    fn new(target: T, owner_id: i64) -> Self {
        Self { target, owner_id }
    }

    pub(crate) fn get(&self) -> &T {
        &self.target
    }

    pub(crate) fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub(crate) fn into_inner(self) -> T {
        self.target
    }
}
