use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use common::rbac::Permission;
use common::types::OptionalProperty;
use metadata::companies::normalize_tax_id;
use metadata::companies::Companies as MDCompanies;
use metadata::error::MetadataError;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ValidationError;
use crate::Context;
use crate::ListResponse;
use crate::PlatformError;
use crate::Result;

pub struct Companies {
    prov: Arc<MDCompanies>,
}

impl Companies {
    pub fn new(prov: Arc<MDCompanies>) -> Self {
        Self { prov }
    }

    pub async fn create(&self, ctx: Context, req: CreateCompanyRequest) -> Result<Company> {
        ctx.check_permission(Permission::ManageCompanies)?;

        let mut verr = ValidationError::new();
        if normalize_tax_id(&req.tax_id).is_empty() {
            verr.push("taxId", "empty tax id");
        }
        if req.name.trim().is_empty() {
            verr.push("name", "empty name");
        }
        verr.result()?;

        let md_req = metadata::companies::CreateCompanyRequest {
            created_by: ctx.account_id()?,
            tax_id: req.tax_id,
            name: req.name,
            active: req.active,
        };

        match self.prov.create(md_req) {
            Ok(company) => Ok(company.into()),
            Err(MetadataError::AlreadyExists(_)) => Err(PlatformError::AlreadyExists(
                "company with this tax id already exists".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_id(&self, ctx: Context, id: u64) -> Result<Company> {
        ctx.check_permission(Permission::ViewCompanies)?;

        Ok(self.prov.get_by_id(id)?.into())
    }

    pub async fn list(&self, ctx: Context) -> Result<ListResponse<Company>> {
        ctx.check_permission(Permission::ViewCompanies)?;

        Ok(self.prov.list()?.into())
    }

    pub async fn update(
        &self,
        ctx: Context,
        company_id: u64,
        req: UpdateCompanyRequest,
    ) -> Result<Company> {
        ctx.check_permission(Permission::ManageCompanies)?;

        if let OptionalProperty::Some(tax_id) = &req.tax_id {
            if normalize_tax_id(tax_id).is_empty() {
                return Err(PlatformError::invalid_field("taxId", "empty tax id"));
            }
        }

        let md_req = metadata::companies::UpdateCompanyRequest {
            updated_by: ctx.account_id()?,
            tax_id: req.tax_id,
            name: req.name,
            active: req.active,
        };

        match self.prov.update(company_id, md_req) {
            Ok(company) => Ok(company.into()),
            Err(MetadataError::AlreadyExists(_)) => Err(PlatformError::invalid_field(
                "taxId",
                "tax id already exists",
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete(&self, ctx: Context, id: u64) -> Result<Company> {
        ctx.check_permission(Permission::ManageCompanies)?;

        Ok(self.prov.delete(id)?.into())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<u64>,
    pub tax_id: String,
    pub name: String,
    pub active: bool,
}

impl From<metadata::companies::Company> for Company {
    fn from(value: metadata::companies::Company) -> Self {
        Company {
            id: value.id,
            created_at: value.created_at,
            created_by: value.created_by,
            updated_at: value.updated_at,
            updated_by: value.updated_by,
            tax_id: value.tax_id,
            name: value.name,
            active: value.active,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub tax_id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub tax_id: OptionalProperty<String>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub name: OptionalProperty<String>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub active: OptionalProperty<bool>,
}
