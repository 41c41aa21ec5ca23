pub mod accounts;
pub mod auth;
pub mod companies;
pub mod events;
pub mod registrations;

use std::sync::Arc;

use axum::middleware;
use axum::Extension;
use axum::Router;
use common::config::Config;
use common::http::print_request_response;
use metadata::MetadataProvider;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::Config as AuthConfig;
use crate::PlatformProvider;

pub fn attach_routes(
    mut router: Router,
    md: &Arc<MetadataProvider>,
    platform: &Arc<PlatformProvider>,
    cfg: Config,
) -> Router {
    router = accounts::attach_routes(router);
    router = auth::attach_routes(router);
    router = companies::attach_routes(router);
    router = events::attach_routes(router);
    router = registrations::attach_routes(router);

    router = router
        .layer(Extension(md.accounts.clone()))
        .layer(Extension(platform.accounts.clone()))
        .layer(Extension(platform.auth.clone()))
        .layer(Extension(platform.companies.clone()))
        .layer(Extension(platform.events.clone()))
        .layer(Extension(platform.registrations.clone()))
        .layer(Extension(AuthConfig::from(&cfg.auth)))
        .layer(Extension(cfg));

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(print_request_response))
            .layer(cors)
            .layer(CookieManagerLayer::new()),
    )
}
