use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use common::http::Json;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use tower_cookies::Cookie;
use tower_cookies::Cookies;

use crate::accounts::Account;
use crate::auth::Auth;
use crate::auth::Config;
use crate::auth::LogInRequest;
use crate::auth::SignUpRequest;
use crate::auth::TokensResponse;
use crate::auth::UpdatePasswordRequest;
use crate::auth::UpdateProfileRequest;
use crate::registrations::Attendance;
use crate::registrations::Registrations;
use crate::Context;
use crate::ListResponse;
use crate::PlatformError;
use crate::Result;

pub const COOKIE_NAME_REFRESH_TOKEN: &str = "refresh_token";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

fn set_refresh_token_cookie(cookies: &Cookies, cfg: &Config, refresh_token: &str) -> Result<()> {
    let ttl = cfg
        .refresh_token_duration
        .to_std()
        .map_err(|err| PlatformError::Internal(err.to_string()))?;

    let cookie = Cookie::build((COOKIE_NAME_REFRESH_TOKEN, refresh_token.to_owned()))
        .expires(OffsetDateTime::now_utc() + ttl)
        .http_only(true)
        .path("/")
        .build();
    cookies.add(cookie);

    Ok(())
}

async fn sign_up(
    cookies: Cookies,
    Extension(provider): Extension<Arc<Auth>>,
    Extension(cfg): Extension<Config>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<TokensResponse>)> {
    let tokens = provider.sign_up(req).await?;
    set_refresh_token_cookie(&cookies, &cfg, tokens.refresh_token.as_str())?;

    Ok((StatusCode::CREATED, Json(tokens)))
}

async fn log_in(
    cookies: Cookies,
    Extension(provider): Extension<Arc<Auth>>,
    Extension(cfg): Extension<Config>,
    Json(req): Json<LogInRequest>,
) -> Result<Json<TokensResponse>> {
    let tokens = provider.log_in(req).await?;
    set_refresh_token_cookie(&cookies, &cfg, tokens.refresh_token.as_str())?;

    Ok(Json(tokens))
}

async fn refresh_token(
    cookies: Cookies,
    Extension(provider): Extension<Arc<Auth>>,
    Extension(cfg): Extension<Config>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<TokensResponse>> {
    // cookie wins over the body
    let refresh_token = if let Some(cookie) = cookies.get(COOKIE_NAME_REFRESH_TOKEN) {
        cookie.value().to_string()
    } else if let Some(token) = req.refresh_token {
        token
    } else {
        return Err(PlatformError::BadRequest(
            "refresh token hasn't been provided".to_string(),
        ));
    };

    let tokens = provider.refresh_token(refresh_token.as_str()).await?;
    set_refresh_token_cookie(&cookies, &cfg, tokens.refresh_token.as_str())?;

    Ok(Json(tokens))
}

async fn get_profile(
    ctx: Context,
    Extension(provider): Extension<Arc<Auth>>,
) -> Result<Json<Account>> {
    Ok(Json(provider.get(ctx).await?))
}

async fn update_profile(
    ctx: Context,
    Extension(provider): Extension<Arc<Auth>>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Account>> {
    Ok(Json(provider.update_profile(ctx, req).await?))
}

async fn update_password(
    ctx: Context,
    Extension(provider): Extension<Arc<Auth>>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<TokensResponse>> {
    Ok(Json(provider.update_password(ctx, req).await?))
}

async fn my_registrations(
    ctx: Context,
    Extension(provider): Extension<Arc<Registrations>>,
) -> Result<Json<ListResponse<Attendance>>> {
    Ok(Json(provider.list_mine(ctx).await?))
}

pub fn attach_routes(router: Router) -> Router {
    router.nest(
        "/api/v1/auth",
        Router::new()
            .route("/signup", post(sign_up))
            .route("/login", post(log_in))
            .route("/refresh-token", post(refresh_token))
            .route("/profile", get(get_profile).put(update_profile))
            .route("/profile/password", put(update_password))
            .route("/registrations", get(my_registrations)),
    )
}
