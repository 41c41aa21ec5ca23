use std::sync::Arc;

use axum::extract::Extension;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing;
use axum::Router;
use common::http::Json;

use crate::events::CreateEventRequest;
use crate::events::Event;
use crate::events::Events;
use crate::events::UpdateEventRequest;
use crate::Context;
use crate::ListResponse;
use crate::Result;

async fn create(
    ctx: Context,
    Extension(provider): Extension<Arc<Events>>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    Ok((
        StatusCode::CREATED,
        Json(provider.create(ctx, request).await?),
    ))
}

// reads are open to anonymous callers
async fn get_by_id(
    ctx: Option<Context>,
    Extension(provider): Extension<Arc<Events>>,
    Path(id): Path<u64>,
) -> Result<Json<Event>> {
    Ok(Json(
        provider.get_by_id(ctx.unwrap_or_default(), id).await?,
    ))
}

async fn list(
    ctx: Option<Context>,
    Extension(provider): Extension<Arc<Events>>,
) -> Result<Json<ListResponse<Event>>> {
    Ok(Json(provider.list(ctx.unwrap_or_default()).await?))
}

async fn update(
    ctx: Context,
    Extension(provider): Extension<Arc<Events>>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    Ok(Json(provider.update(ctx, id, request).await?))
}

async fn delete(
    ctx: Context,
    Extension(provider): Extension<Arc<Events>>,
    Path(id): Path<u64>,
) -> Result<Json<Event>> {
    Ok(Json(provider.delete(ctx, id).await?))
}

pub fn attach_routes(router: Router) -> Router {
    router.nest(
        "/api/v1/events",
        Router::new()
            .route("/", routing::post(create).get(list))
            .route("/:id", routing::get(get_by_id).delete(delete).put(update)),
    )
}
