use std::sync::Arc;

use crate::application::BlogSettings;
use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::catalog_service::CatalogService;
use crate::application::comment_service::CommentService;
use crate::application::profile_service::ProfileService;
use crate::data::Repositories;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) blog_service: Arc<BlogService>,
    pub(crate) comment_service: Arc<CommentService>,
    pub(crate) catalog_service: Arc<CatalogService>,
    pub(crate) profile_service: Arc<ProfileService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(repos: &Repositories, settings: BlogSettings, jwt: Arc<JwtService>) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(repos.users.clone(), jwt.clone())),
            blog_service: Arc::new(BlogService::new(repos, settings)),
            comment_service: Arc::new(CommentService::new(repos, settings)),
            catalog_service: Arc::new(CatalogService::new(repos.catalog.clone())),
            profile_service: Arc::new(ProfileService::new(repos.users.clone())),
            jwt,
        }
    }
}
