use std::sync::Arc;

use axum::async_trait;
use axum::extract::Extension;
use axum::http::request::Parts;
use axum_core::extract::FromRequestParts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use common::rbac::role_permissions;
use common::rbac::Permission;
use common::rbac::Role;
use metadata::accounts::Account;

use crate::auth;
use crate::auth::token::parse_access_token;
use crate::error::AuthError;
use crate::PlatformError;
use crate::Result;

/// Who is calling, resolved once per request. The default value is the
/// anonymous caller.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub account_id: Option<u64>,
    pub role: Option<Role>,
    pub permissions: Vec<Permission>,
    pub company_id: Option<u64>,
}

impl Context {
    pub fn new(account: &Account) -> Self {
        Context {
            account_id: Some(account.id),
            role: account.role,
            permissions: account.role.map(role_permissions).unwrap_or_default(),
            company_id: account.company_id,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.account_id.is_some()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&Permission::All) || self.permissions.contains(&permission)
    }

    pub fn check_permission(&self, permission: Permission) -> Result<()> {
        if self.has_permission(permission) {
            return Ok(());
        }

        Err(PlatformError::Forbidden("forbidden".to_string()))
    }

    /// Id of the authenticated caller.
    pub fn account_id(&self) -> Result<u64> {
        self.account_id
            .ok_or_else(|| PlatformError::Unauthorized("login required".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where S: Send + Sync
{
    type Rejection = PlatformError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> core::result::Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_err| AuthError::CantParseBearerHeader)?;

        let Extension(auth_cfg) = Extension::<auth::Config>::from_request_parts(parts, state)
            .await
            .map_err(|err| PlatformError::Internal(err.to_string()))?;

        let claims = parse_access_token(bearer.token(), &auth_cfg.access_token_key)
            .map_err(|err| err.wrap_into(AuthError::CantParseAccessToken))?;
        let Extension(md_accounts) =
            Extension::<Arc<metadata::accounts::Accounts>>::from_request_parts(parts, state)
                .await
                .map_err(|err| PlatformError::Internal(err.to_string()))?;

        // a token that outlived its account is just a bad token
        let account = md_accounts
            .get_by_id(claims.account_id)
            .map_err(|err| PlatformError::from(err).wrap_into(AuthError::CantParseAccessToken))?;

        Ok(Context::new(&account))
    }
}
