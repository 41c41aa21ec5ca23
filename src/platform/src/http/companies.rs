use std::sync::Arc;

use axum::extract::Extension;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing;
use axum::Router;
use common::http::Json;

use crate::companies::Companies;
use crate::companies::Company;
use crate::companies::CreateCompanyRequest;
use crate::companies::UpdateCompanyRequest;
use crate::Context;
use crate::ListResponse;
use crate::Result;

async fn create(
    ctx: Context,
    Extension(provider): Extension<Arc<Companies>>,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>)> {
    Ok((
        StatusCode::CREATED,
        Json(provider.create(ctx, request).await?),
    ))
}

async fn get_by_id(
    ctx: Context,
    Extension(provider): Extension<Arc<Companies>>,
    Path(id): Path<u64>,
) -> Result<Json<Company>> {
    Ok(Json(provider.get_by_id(ctx, id).await?))
}

async fn list(
    ctx: Context,
    Extension(provider): Extension<Arc<Companies>>,
) -> Result<Json<ListResponse<Company>>> {
    Ok(Json(provider.list(ctx).await?))
}

async fn update(
    ctx: Context,
    Extension(provider): Extension<Arc<Companies>>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateCompanyRequest>,
) -> Result<Json<Company>> {
    Ok(Json(provider.update(ctx, id, request).await?))
}

async fn delete(
    ctx: Context,
    Extension(provider): Extension<Arc<Companies>>,
    Path(id): Path<u64>,
) -> Result<Json<Company>> {
    Ok(Json(provider.delete(ctx, id).await?))
}

pub fn attach_routes(router: Router) -> Router {
    router.nest(
        "/api/v1/companies",
        Router::new()
            .route("/", routing::post(create).get(list))
            .route("/:id", routing::get(get_by_id).delete(delete).put(update)),
    )
}
