//! Authentication handlers.

use actix_web::{HttpResponse, web};

use feedline_core::service::Signup;
use feedline_shared::dto::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .auth
        .signup(Signup {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created".to_string(),
        user_id: user.id.to_hex(),
    }))
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let session = state.auth.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: session.token,
        user_id: session.user_id.to_hex(),
    }))
}
