use std::sync::Arc;

use axum::Router;
use common::config::Config;
use common::rbac::Role;
use common::ADMIN_ID;
use metadata::accounts::Account;
use metadata::accounts::CreateAccountRequest;
use metadata::error::MetadataError;
use metadata::MetadataProvider;
use platform::auth;
use platform::auth::password::make_password_hash;
use platform::notifications::Notifier;
use platform::PlatformProvider;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::info;

pub mod command;
pub mod config;
pub mod error;

pub const ADMIN_EMAIL: &str = "admin@admin.com";

/// Creates the admin account on the first start. Its random password is
/// printed once and has to be changed on first login.
pub fn init_admin(md: &Arc<MetadataProvider>) -> error::Result<Account> {
    match md.accounts.get_by_id(ADMIN_ID) {
        Ok(acc) => Ok(acc),
        Err(MetadataError::NotFound(_)) => {
            let pwd: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();

            info!("creating admin account...");
            let acc = md.accounts.create(CreateAccountRequest {
                created_by: None,
                password_hash: make_password_hash(&pwd)?,
                email: ADMIN_EMAIL.to_string(),
                first_name: Some("admin".to_string()),
                last_name: None,
                company_id: None,
                position: None,
                document: None,
                phone: None,
                force_update_password: true,
                role: Some(Role::Admin),
            })?;
            info!("email: {}", acc.email);
            info!("password: {pwd}");

            Ok(acc)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn init_platform(
    md: Arc<MetadataProvider>,
    notifier: Arc<dyn Notifier>,
    router: Router,
    cfg: Config,
) -> Router {
    let platform_provider = Arc::new(PlatformProvider::new(
        md.clone(),
        notifier,
        auth::Config::from(&cfg.auth),
    ));

    info!("attaching platform routes...");
    platform::http::attach_routes(router, &md, &platform_provider, cfg)
}

#[cfg(test)]
mod tests {
    use std::env::temp_dir;
    use std::sync::Arc;

    use common::rbac::Role;
    use metadata::MetadataProvider;
    use uuid::Uuid;

    use super::init_admin;
    use super::ADMIN_EMAIL;

    #[test]
    fn test_init_admin_once() {
        let mut path = temp_dir();
        path.push(format!("{}.db", Uuid::new_v4()));
        let db = Arc::new(metadata::rocksdb::new(path).unwrap());
        let md = Arc::new(MetadataProvider::try_new(db).unwrap());

        let first = init_admin(&md).unwrap();
        assert_eq!(first.id, common::ADMIN_ID);
        assert_eq!(first.email, ADMIN_EMAIL);
        assert_eq!(first.role, Some(Role::Admin));
        assert!(first.force_update_password);

        let second = init_admin(&md).unwrap();
        assert_eq!(second, first);
    }
}
