use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use common::rbac::Permission;
use common::rbac::Role;
use common::types::OptionalProperty;
use metadata::accounts::Accounts as MDAccounts;
use metadata::companies::Companies as MDCompanies;
use metadata::error::MetadataError;
use serde::Deserialize;
use serde::Serialize;
use validator::validate_email;

use crate::auth::password::make_password_hash;
use crate::error::AuthError;
use crate::error::ValidationError;
use crate::Context;
use crate::ListResponse;
use crate::PlatformError;
use crate::Result;

pub struct Accounts {
    prov: Arc<MDAccounts>,
    companies: Arc<MDCompanies>,
}

impl Accounts {
    pub fn new(prov: Arc<MDAccounts>, companies: Arc<MDCompanies>) -> Self {
        Self { prov, companies }
    }

    fn validate_company(&self, company_id: Option<u64>) -> Result<()> {
        let Some(company_id) = company_id else {
            return Ok(());
        };

        match self.companies.get_by_id(company_id) {
            Ok(_) => Ok(()),
            Err(MetadataError::NotFound(_)) => Err(PlatformError::invalid_field(
                "companyId",
                "company not found",
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn create(&self, ctx: Context, req: CreateAccountRequest) -> Result<Account> {
        ctx.check_permission(Permission::ManageAccounts)?;

        let mut verr = ValidationError::new();
        if !validate_email(&req.email) {
            verr.push("email", "invalid email");
        }
        if req.password.is_empty() {
            verr.push("password", "empty password");
        }
        verr.result()?;
        self.validate_company(req.company_id)?;

        let md_req = metadata::accounts::CreateAccountRequest {
            created_by: ctx.account_id,
            password_hash: make_password_hash(req.password.as_str())
                .map_err(|err| err.wrap_into(AuthError::InvalidPasswordHashing))?,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            company_id: req.company_id,
            position: req.position,
            document: req.document,
            phone: req.phone,
            force_update_password: req.force_update_password,
            role: req.role,
        };

        let account = match self.prov.create(md_req) {
            Ok(account) => account,
            Err(MetadataError::AlreadyExists(_)) => {
                return Err(PlatformError::AlreadyExists(
                    "account already exists".to_string(),
                ));
            }
            Err(other) => return Err(other.into()),
        };

        Ok(account.into())
    }

    pub async fn get_by_id(&self, ctx: Context, id: u64) -> Result<Account> {
        ctx.check_permission(Permission::ViewAccounts)?;

        Ok(self.prov.get_by_id(id)?.into())
    }

    pub async fn list(&self, ctx: Context) -> Result<ListResponse<Account>> {
        ctx.check_permission(Permission::ViewAccounts)?;

        Ok(self.prov.list()?.into())
    }

    pub async fn update(
        &self,
        ctx: Context,
        account_id: u64,
        req: UpdateAccountRequest,
    ) -> Result<Account> {
        ctx.check_permission(Permission::ManageAccounts)?;

        if let OptionalProperty::Some(email) = &req.email {
            if !validate_email(email) {
                return Err(PlatformError::invalid_field("email", "invalid email"));
            }
        }
        if let OptionalProperty::Some(company_id) = &req.company_id {
            self.validate_company(*company_id)?;
        }

        let mut md_req = metadata::accounts::UpdateAccountRequest {
            updated_by: ctx.account_id()?,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            company_id: req.company_id,
            position: req.position,
            document: req.document,
            phone: req.phone,
            force_update_password: req.force_update_password,
            role: req.role,
            ..Default::default()
        };
        if let OptionalProperty::Some(password) = req.password {
            md_req.password_hash.insert(
                make_password_hash(password.as_str())
                    .map_err(|err| err.wrap_into(AuthError::InvalidPasswordHashing))?,
            );
        }

        let account = match self.prov.update(account_id, md_req) {
            Ok(account) => account,
            Err(MetadataError::AlreadyExists(_)) => {
                return Err(PlatformError::invalid_field(
                    "email",
                    "email already exists",
                ));
            }
            Err(other) => return Err(other.into()),
        };

        Ok(account.into())
    }

    pub async fn delete(&self, ctx: Context, id: u64) -> Result<Account> {
        ctx.check_permission(Permission::ManageAccounts)?;

        Ok(self.prov.delete(id)?.into())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<u64>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_id: Option<u64>,
    pub position: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub force_update_password: bool,
    pub role: Option<Role>,
}

impl From<metadata::accounts::Account> for Account {
    fn from(value: metadata::accounts::Account) -> Self {
        Account {
            id: value.id,
            created_at: value.created_at,
            created_by: value.created_by,
            updated_at: value.updated_at,
            updated_by: value.updated_by,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            company_id: value.company_id,
            position: value.position,
            document: value.document,
            phone: value.phone,
            force_update_password: value.force_update_password,
            role: value.role,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub password: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_id: Option<u64>,
    pub position: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub force_update_password: bool,
    pub role: Option<Role>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub password: OptionalProperty<String>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub email: OptionalProperty<String>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub first_name: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub last_name: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub company_id: OptionalProperty<Option<u64>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub position: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub document: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub phone: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub force_update_password: OptionalProperty<bool>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub role: OptionalProperty<Option<Role>>,
}
