mod accounts;
mod auth;
mod events;
mod registrations;

#[cfg(test)]
mod tests {
    use std::env::temp_dir;
    use std::net::SocketAddr;
    use std::sync::atomic::AtomicU16;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::Router;
    use chrono::Duration;
    use chrono::Utc;
    use common::config;
    use common::config::Config;
    use common::rbac::Role;
    use lazy_static::lazy_static;
    use metadata::accounts::Accounts;
    use metadata::events::CreateEventRequest;
    use metadata::MetadataProvider;
    use platform::auth::password::make_password_hash;
    use platform::auth::Auth;
    use platform::auth::LogInRequest;
    use platform::http::attach_routes;
    use platform::notifications::LogNotifier;
    use reqwest::header::HeaderMap;
    use reqwest::header::HeaderValue;
    use reqwest::header::AUTHORIZATION;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;
    use tokio::time::sleep;
    use uuid::Uuid;

    pub const STRONG_PASSWORD: &str = "Lilac-Harbor-Tram-1987";

    lazy_static! {
        pub static ref EMPTY_LIST: serde_json::Value = json!({"data":[],"meta":{"next":null}});
        pub static ref TEST_CFG: Config = Config {
            auth: config::Auth {
                access_token_duration: Duration::days(1),
                refresh_token_duration: Duration::days(1),
                access_token_key: "access".to_string(),
                refresh_token_key: "refresh".to_string(),
            },
            ..Default::default()
        };
    }
    static HTTP_PORT: AtomicU16 = AtomicU16::new(8180);

    pub fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers
    }

    pub async fn login(auth: &Arc<Auth>, email: &str, password: &str) -> anyhow::Result<HeaderMap> {
        let tokens = auth
            .log_in(LogInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let mut headers = json_headers();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(format!("Bearer {}", tokens.access_token).as_str())?,
        );

        Ok(headers)
    }

    pub async fn create_acc_and_login(
        auth: &Arc<Auth>,
        md_acc: &Arc<Accounts>,
        email: &str,
        company_id: Option<u64>,
        role: Role,
    ) -> anyhow::Result<HeaderMap> {
        let pwd = "password";

        md_acc.create(metadata::accounts::CreateAccountRequest {
            created_by: None,
            password_hash: make_password_hash(pwd)?,
            email: email.to_string(),
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            company_id,
            position: None,
            document: None,
            phone: None,
            force_update_password: false,
            role: Some(role),
        })?;

        login(auth, email, pwd).await
    }

    pub async fn create_admin_acc_and_login(
        auth: &Arc<Auth>,
        md_acc: &Arc<Accounts>,
    ) -> anyhow::Result<HeaderMap> {
        create_acc_and_login(auth, md_acc, "admin@mail.com", None, Role::Admin).await
    }

    pub fn create_event(md: &MetadataProvider, published: bool) -> anyhow::Result<u64> {
        Ok(md
            .events
            .create(CreateEventRequest {
                created_by: 1,
                title: "Franchise Summit".to_string(),
                description: None,
                location: None,
                starts_at: Utc::now() + Duration::days(5),
                is_published: published,
                is_highlighted: false,
                exclusive_for_members: false,
                vacancy_total: 2,
                vacancy_online: 2,
                vacancies_per_brand: 2,
                free_online: false,
            })?
            .id)
    }

    pub async fn run_http_service() -> anyhow::Result<(
        String,
        Arc<MetadataProvider>,
        Arc<platform::PlatformProvider>,
    )> {
        let mut path = temp_dir();
        path.push(format!("{}", Uuid::new_v4()));
        let rocks = Arc::new(metadata::rocksdb::new(path.join("md"))?);
        let md = Arc::new(MetadataProvider::try_new(rocks)?);

        let platform_provider = Arc::new(platform::PlatformProvider::new(
            md.clone(),
            Arc::new(LogNotifier::default()),
            platform::auth::Config::from(&TEST_CFG.auth),
        ));

        let addr = SocketAddr::from(([127, 0, 0, 1], HTTP_PORT.fetch_add(1, Ordering::SeqCst)));
        let router = attach_routes(Router::new(), &md, &platform_provider, TEST_CFG.clone());
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
        });

        sleep(tokio::time::Duration::from_millis(100)).await;

        let base_addr = format!("http://{:?}:{:?}/api/v1", addr.ip(), addr.port());

        Ok((base_addr, md, platform_provider))
    }

    #[macro_export]
    macro_rules! assert_response_status_eq {
        ($resp:expr,$status:expr) => {{
            assert_eq!(
                $resp.status(),
                $status,
                "{}",
                $resp.text().await.unwrap().as_str()
            )
        }};
    }

    #[macro_export]
    macro_rules! assert_response_json_eq {
        ($resp:expr, $body:expr) => {{ assert_eq!($resp.text().await.unwrap(), $body.to_string()) }};
    }
}
