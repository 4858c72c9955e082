use academia_core::FieldError;
use academia_models::auth::{
    LoginRequest, MessageResponse, PasswordResetConfirmRequest, PasswordResetRequest,
    TokenResponse,
};
use academia_models::users::{DeleteUsersRequest, NewUser, UpdateUser};
use academia_models::{Role, User};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::request_password_reset,
        crate::modules::auth::controller::confirm_password_reset,
        crate::modules::users::controller::register_user,
        crate::modules::users::controller::get_roles,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::delete_users,
    ),
    components(
        schemas(
            User,
            Role,
            NewUser,
            UpdateUser,
            DeleteUsersRequest,
            LoginRequest,
            TokenResponse,
            PasswordResetRequest,
            PasswordResetConfirmRequest,
            MessageResponse,
            ErrorResponse,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token refresh and password reset"),
        (name = "Users", description = "User registration, profile and management")
    ),
    info(
        title = "Academia API",
        version = "0.1.0",
        description = "Authentication and user management for a multi-tenant school-management service.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
