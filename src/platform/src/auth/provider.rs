use std::sync::Arc;

use chrono::Duration;
use common::rbac::Role;
use common::types::OptionalProperty;
use metadata::accounts::Accounts;
use metadata::accounts::CreateAccountRequest;
use metadata::accounts::UpdateAccountRequest;
use metadata::companies::Companies;
use metadata::error::MetadataError;
use password_hash::PasswordHash;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use validator::validate_email;

use super::password::make_password_hash;
use super::password::verify_password;
use super::token::make_access_token;
use super::token::make_refresh_token;
use super::token::parse_refresh_token;
use crate::accounts::Account;
use crate::error::AuthError;
use crate::error::ValidationError;
use crate::Context;
use crate::PlatformError;
use crate::Result;

/// Passwords scoring below this on zxcvbn's 0..=4 scale are rejected.
const MIN_PASSWORD_SCORE: u8 = 3;

fn check_password_strength(password: &str, user_inputs: &[&str]) -> Result<()> {
    match zxcvbn::zxcvbn(password, user_inputs) {
        Ok(ent) if ent.score() < MIN_PASSWORD_SCORE => Err(PlatformError::invalid_field(
            "password",
            "password is too simple",
        )),
        Err(err) => Err(PlatformError::invalid_field("password", err.to_string())),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct Auth {
    accounts: Arc<Accounts>,
    companies: Arc<Companies>,
    access_token_duration: Duration,
    access_token_key: String,
    refresh_token_duration: Duration,
    refresh_token_key: String,
}

impl Auth {
    pub fn new(accounts: Arc<Accounts>, companies: Arc<Companies>, cfg: Config) -> Self {
        Self {
            accounts,
            companies,
            access_token_duration: cfg.access_token_duration,
            access_token_key: cfg.access_token_key,
            refresh_token_duration: cfg.refresh_token_duration,
            refresh_token_key: cfg.refresh_token_key,
        }
    }

    fn make_tokens(&self, account_id: u64) -> Result<TokensResponse> {
        Ok(TokensResponse {
            access_token: make_access_token(
                account_id,
                self.access_token_duration,
                self.access_token_key.as_str(),
            )
            .map_err(|err| err.wrap_into(AuthError::CantMakeAccessToken))?,
            refresh_token: make_refresh_token(
                account_id,
                self.refresh_token_duration,
                self.refresh_token_key.as_str(),
            )
            .map_err(|err| err.wrap_into(AuthError::CantMakeRefreshToken))?,
        })
    }

    /// Self-service registration of a member account.
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<TokensResponse> {
        let mut verr = ValidationError::new();
        if !validate_email(&req.email) {
            verr.push("email", "invalid email");
        }
        if req.password != req.password_repeat {
            verr.push("passwordRepeat", "password doesn't match");
        }
        verr.result()?;

        check_password_strength(&req.password, &[req.email.as_str()])?;

        let company_id = match &req.company_tax_id {
            None => None,
            Some(tax_id) => match self.companies.get_by_tax_id(tax_id) {
                Ok(company) => Some(company.id),
                Err(MetadataError::NotFound(_)) => {
                    return Err(PlatformError::invalid_field(
                        "companyTaxId",
                        "company not found",
                    ));
                }
                Err(err) => return Err(err.into()),
            },
        };

        let password_hash = make_password_hash(req.password.as_str())
            .map_err(|err| err.wrap_into(AuthError::InvalidPasswordHashing))?;

        let maybe_account = self.accounts.create(CreateAccountRequest {
            created_by: None,
            password_hash,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            company_id,
            position: req.position,
            document: req.document,
            phone: req.phone,
            force_update_password: false,
            role: Some(Role::Member),
        });

        let account = match maybe_account {
            Ok(account) => account,
            Err(MetadataError::AlreadyExists(_)) => {
                return Err(PlatformError::AlreadyExists(
                    "account already exists".to_string(),
                ));
            }
            Err(other) => return Err(other.into()),
        };
        info!("account {} signed up", account.id);

        self.make_tokens(account.id)
    }

    pub async fn log_in(&self, req: LogInRequest) -> Result<TokensResponse> {
        if !validate_email(&req.email) {
            return Err(PlatformError::invalid_field("email", "invalid email"));
        }

        let account = self
            .accounts
            .get_by_email(&req.email)
            .map_err(|_err| AuthError::InvalidCredentials)?;

        verify_password(
            req.password,
            PasswordHash::new(account.password_hash.as_str())?,
        )
        .map_err(|_err| AuthError::InvalidCredentials)?;

        self.make_tokens(account.id)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokensResponse> {
        let refresh_claims = parse_refresh_token(refresh_token, self.refresh_token_key.as_str())
            .map_err(|err| err.wrap_into(AuthError::InvalidRefreshToken))?;
        // deleted accounts can't refresh
        self.accounts
            .get_by_id(refresh_claims.account_id)
            .map_err(|_err| AuthError::InvalidRefreshToken)?;

        self.make_tokens(refresh_claims.account_id)
    }

    pub async fn get(&self, ctx: Context) -> Result<Account> {
        match self.accounts.get_by_id(ctx.account_id()?) {
            Ok(acc) => Ok(acc.into()),
            Err(MetadataError::NotFound(_)) => {
                Err(PlatformError::NotFound("account not found".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Edits the caller's own profile. Attendance records keep the values
    /// they were created with.
    pub async fn update_profile(&self, ctx: Context, req: UpdateProfileRequest) -> Result<Account> {
        let account_id = ctx.account_id()?;

        if let OptionalProperty::Some(Some(name)) = &req.first_name {
            if name.trim().is_empty() {
                return Err(PlatformError::invalid_field("firstName", "empty name"));
            }
        }

        let md_req = UpdateAccountRequest {
            updated_by: account_id,
            first_name: req.first_name,
            last_name: req.last_name,
            position: req.position,
            document: req.document,
            phone: req.phone,
            ..Default::default()
        };

        Ok(self.accounts.update(account_id, md_req)?.into())
    }

    pub async fn update_password(
        &self,
        ctx: Context,
        req: UpdatePasswordRequest,
    ) -> Result<TokensResponse> {
        let account = self.accounts.get_by_id(ctx.account_id()?)?;

        if verify_password(
            &req.password,
            PasswordHash::new(account.password_hash.as_str())?,
        )
        .is_err()
        {
            return Err(PlatformError::invalid_field("password", "invalid password"));
        }
        check_password_strength(&req.new_password, &[account.email.as_str()])?;

        let password_hash = make_password_hash(req.new_password.as_str())
            .map_err(|err| err.wrap_into(AuthError::InvalidPasswordHashing))?;

        let md_req = UpdateAccountRequest {
            updated_by: account.id,
            password_hash: OptionalProperty::Some(password_hash),
            force_update_password: OptionalProperty::Some(false),
            ..Default::default()
        };

        self.accounts.update(account.id, md_req)?;

        self.make_tokens(account.id)
    }
}

#[derive(Clone)]
pub struct Config {
    pub access_token_duration: Duration,
    pub access_token_key: String,
    pub refresh_token_duration: Duration,
    pub refresh_token_key: String,
}

impl From<&common::config::Auth> for Config {
    fn from(cfg: &common::config::Auth) -> Self {
        Config {
            access_token_duration: cfg.access_token_duration,
            access_token_key: cfg.access_token_key.clone(),
            refresh_token_duration: cfg.refresh_token_duration,
            refresh_token_key: cfg.refresh_token_key.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub password_repeat: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Links the new account to an existing company.
    pub company_tax_id: Option<String>,
    pub position: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub first_name: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub last_name: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub position: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub document: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub phone: OptionalProperty<Option<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub new_password: String,
}
