use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use common::rbac::Permission;
use common::types::OptionalProperty;
use metadata::events::Events as MDEvents;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::error::ValidationError;
use crate::Context;
use crate::ListResponse;
use crate::PlatformError;
use crate::Result;

pub struct Events {
    prov: Arc<MDEvents>,
}

impl Events {
    pub fn new(prov: Arc<MDEvents>) -> Self {
        Self { prov }
    }

    pub async fn create(&self, ctx: Context, req: CreateEventRequest) -> Result<Event> {
        ctx.check_permission(Permission::ManageEvents)?;

        let mut verr = ValidationError::new();
        if req.title.trim().is_empty() {
            verr.push("title", "empty title");
        }
        verr.result()?;

        let event = self.prov.create(metadata::events::CreateEventRequest {
            created_by: ctx.account_id()?,
            title: req.title,
            description: req.description,
            location: req.location,
            starts_at: req.starts_at,
            is_published: req.is_published,
            is_highlighted: req.is_highlighted,
            exclusive_for_members: req.exclusive_for_members,
            vacancy_total: req.vacancy_total,
            vacancy_online: req.vacancy_online,
            vacancies_per_brand: req.vacancies_per_brand,
            free_online: req.free_online,
        })?;
        info!("event {} created", event.id);

        Ok(event.into())
    }

    /// Unpublished events are only visible to callers with `ViewEvents`;
    /// everyone else gets "not found".
    pub async fn get_by_id(&self, ctx: Context, id: u64) -> Result<Event> {
        let event = self.prov.get_by_id(id)?;
        if !event.is_published && !ctx.has_permission(Permission::ViewEvents) {
            return Err(PlatformError::NotFound(format!("event {id} not found")));
        }

        Ok(event.into())
    }

    pub async fn list(&self, ctx: Context) -> Result<ListResponse<Event>> {
        let mut resp = self.prov.list()?;
        if !ctx.has_permission(Permission::ViewEvents) {
            resp.data.retain(|event| event.is_published);
        }

        Ok(resp.into())
    }

    pub async fn update(&self, ctx: Context, event_id: u64, req: UpdateEventRequest) -> Result<Event> {
        ctx.check_permission(Permission::ManageEvents)?;

        if let OptionalProperty::Some(title) = &req.title {
            if title.trim().is_empty() {
                return Err(PlatformError::invalid_field("title", "empty title"));
            }
        }

        let md_req = metadata::events::UpdateEventRequest {
            updated_by: ctx.account_id()?,
            title: req.title,
            description: req.description,
            location: req.location,
            starts_at: req.starts_at,
            is_published: req.is_published,
            is_highlighted: req.is_highlighted,
            exclusive_for_members: req.exclusive_for_members,
            vacancy_total: req.vacancy_total,
            vacancy_online: req.vacancy_online,
            vacancies_per_brand: req.vacancies_per_brand,
            free_online: req.free_online,
        };

        Ok(self.prov.update(event_id, md_req)?.into())
    }

    /// Also drops the event's attendance list.
    pub async fn delete(&self, ctx: Context, id: u64) -> Result<Event> {
        ctx.check_permission(Permission::ManageEvents)?;

        let event = self.prov.delete(id)?;
        info!("event {id} deleted");

        Ok(event.into())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<u64>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub is_published: bool,
    pub is_highlighted: bool,
    pub exclusive_for_members: bool,
    pub vacancy_total: u32,
    pub vacancy_online: u32,
    pub vacancies_per_brand: u32,
    pub free_online: bool,
}

impl From<metadata::events::Event> for Event {
    fn from(value: metadata::events::Event) -> Self {
        Event {
            id: value.id,
            created_at: value.created_at,
            created_by: value.created_by,
            updated_at: value.updated_at,
            updated_by: value.updated_by,
            title: value.title,
            description: value.description,
            location: value.location,
            starts_at: value.starts_at,
            is_published: value.is_published,
            is_highlighted: value.is_highlighted,
            exclusive_for_members: value.exclusive_for_members,
            vacancy_total: value.vacancy_total,
            vacancy_online: value.vacancy_online,
            vacancies_per_brand: value.vacancies_per_brand,
            free_online: value.free_online,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_highlighted: bool,
    #[serde(default)]
    pub exclusive_for_members: bool,
    pub vacancy_total: u32,
    pub vacancy_online: u32,
    pub vacancies_per_brand: u32,
    #[serde(default)]
    pub free_online: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub title: OptionalProperty<String>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub description: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub location: OptionalProperty<Option<String>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub starts_at: OptionalProperty<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub is_published: OptionalProperty<bool>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub is_highlighted: OptionalProperty<bool>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub exclusive_for_members: OptionalProperty<bool>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub vacancy_total: OptionalProperty<u32>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub vacancy_online: OptionalProperty<u32>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub vacancies_per_brand: OptionalProperty<u32>,
    #[serde(default, skip_serializing_if = "OptionalProperty::is_none")]
    pub free_online: OptionalProperty<bool>,
}
