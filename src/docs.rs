use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::model::{
    ForgetPasswordRequest, GoogleSignInRequest, MessageResponse, RecoverPasswordRequest,
    SessionResponse, SigninRequest, SignupRequest,
};
use crate::modules::users::model::{UpdateProfileDto, UserInfo};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::signup,
        crate::modules::auth::controller::verify_email,
        crate::modules::auth::controller::signin,
        crate::modules::auth::controller::google_sign_in,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::sign_out,
        crate::modules::auth::controller::forget_password,
        crate::modules::auth::controller::recover_password,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
    ),
    components(
        schemas(
            SignupRequest,
            SigninRequest,
            GoogleSignInRequest,
            ForgetPasswordRequest,
            RecoverPasswordRequest,
            SessionResponse,
            MessageResponse,
            UserInfo,
            UpdateProfileDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, verification, sessions, and recovery"),
        (name = "Users", description = "Profile endpoints for the authenticated user")
    ),
    info(
        title = "Stead API",
        version = "0.1.0",
        description = "Backend for the Stead property-listing marketplace: stateless token-based authentication with email verification, federated sign-in, and password recovery.",
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
