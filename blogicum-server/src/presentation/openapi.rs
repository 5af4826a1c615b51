use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::PageQuery;
use crate::presentation::handlers::auth::{LoginDto, RegisterDto, SessionDto, UserDto};
use crate::presentation::handlers::catalog::{CategoryDto, CategoryPostsDto, LocationDto};
use crate::presentation::handlers::comments::{CommentDto, CommentPayloadDto};
use crate::presentation::handlers::posts::{
    PostCategoryDto, PostDetailDto, PostDto, PostLocationDto, PostPageDto, PostPayloadDto,
    PostSummaryDto,
};
use crate::presentation::handlers::profiles::{ProfileDto, ProfilePageDto, UpdateProfileDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::comments::list_comments,
        crate::presentation::handlers::comments::add_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::catalog::list_categories,
        crate::presentation::handlers::catalog::list_locations,
        crate::presentation::handlers::catalog::category_posts,
        crate::presentation::handlers::profiles::get_profile,
        crate::presentation::handlers::profiles::update_profile
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            SessionDto,
            UserDto,
            PageQuery,
            PostPayloadDto,
            PostCategoryDto,
            PostLocationDto,
            PostDto,
            PostSummaryDto,
            PostPageDto,
            PostDetailDto,
            CommentPayloadDto,
            CommentDto,
            CategoryDto,
            LocationDto,
            CategoryPostsDto,
            ProfileDto,
            ProfilePageDto,
            UpdateProfileDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Posts, visibility gated per viewer"),
        (name = "comments", description = "Comments of accessible posts"),
        (name = "catalog", description = "Categories and locations"),
        (name = "profiles", description = "Author profiles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_visibility_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/posts",
            "/api/posts/{id}",
            "/api/posts/{id}/comments/{comment_id}",
            "/api/categories/{slug}/posts",
            "/api/profiles/{username}",
            "/api/profile",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} must be documented");
        }
    }
}
