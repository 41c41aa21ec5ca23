use std::sync::Arc;

use axum::extract::Extension;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing;
use axum::Router;
use common::http::Json;

use crate::registrations::Attendance;
use crate::registrations::CheckInRequest;
use crate::registrations::Eligibility;
use crate::registrations::RegisterRequest;
use crate::registrations::Registrations;
use crate::Context;
use crate::ListResponse;
use crate::Result;

/// Anonymous callers get an answer too, so clients can show "log in to
/// register".
async fn check(
    ctx: Option<Context>,
    Extension(provider): Extension<Arc<Registrations>>,
    Path(event_id): Path<u64>,
) -> Result<Json<Eligibility>> {
    Ok(Json(
        provider.check(ctx.unwrap_or_default(), event_id).await?,
    ))
}

async fn register(
    ctx: Option<Context>,
    Extension(provider): Extension<Arc<Registrations>>,
    Path(event_id): Path<u64>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Attendance>)> {
    Ok((
        StatusCode::CREATED,
        Json(
            provider
                .register(ctx.unwrap_or_default(), event_id, request)
                .await?,
        ),
    ))
}

async fn list_for_event(
    ctx: Context,
    Extension(provider): Extension<Arc<Registrations>>,
    Path(event_id): Path<u64>,
) -> Result<Json<ListResponse<Attendance>>> {
    Ok(Json(provider.list_for_event(ctx, event_id).await?))
}

async fn cancel(
    ctx: Context,
    Extension(provider): Extension<Arc<Registrations>>,
    Path(id): Path<u64>,
) -> Result<Json<Attendance>> {
    Ok(Json(provider.cancel(ctx, id).await?))
}

async fn check_in(
    ctx: Context,
    Extension(provider): Extension<Arc<Registrations>>,
    Path(id): Path<u64>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<Attendance>> {
    Ok(Json(provider.check_in(ctx, id, request).await?))
}

pub fn attach_routes(router: Router) -> Router {
    router
        .route(
            "/api/v1/events/:id/registration",
            routing::get(check).post(register),
        )
        .route(
            "/api/v1/events/:id/attendance",
            routing::get(list_for_event),
        )
        .nest(
            "/api/v1/attendance",
            Router::new()
                .route("/:id", routing::delete(cancel))
                .route("/:id/check-in", routing::put(check_in)),
        )
}
