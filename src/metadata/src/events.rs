use std::sync::Arc;

use bincode::deserialize;
use bincode::serialize;
use chrono::DateTime;
use chrono::Utc;
use common::types::OptionalProperty;
use rocksdb::Transaction;
use rocksdb::TransactionDB;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::attendance;
use crate::error::MetadataError;
use crate::index::next_seq;
use crate::list_data;
use crate::make_data_value_key;
use crate::make_id_seq_key;
use crate::metadata::ListResponse;
use crate::Result;

const NAMESPACE: &[u8] = b"events";

fn decode_event(id: u64, value: Option<Vec<u8>>) -> Result<Event> {
    match value {
        None => Err(MetadataError::NotFound(format!("event {id} not found"))),
        Some(value) => Ok(deserialize(&value)?),
    }
}

pub(crate) fn get_by_id_(tx: &Transaction<TransactionDB>, id: u64) -> Result<Event> {
    decode_event(id, tx.get(make_data_value_key(NAMESPACE, id))?)
}

/// Reads the event and holds an exclusive lock on it until `tx` ends.
/// Registrations for the same event serialize on this lock.
pub(crate) fn lock_(tx: &Transaction<TransactionDB>, id: u64) -> Result<Event> {
    decode_event(
        id,
        tx.get_for_update(make_data_value_key(NAMESPACE, id), true)?,
    )
}

pub struct Events {
    db: Arc<TransactionDB>,
}

impl Events {
    pub fn new(db: Arc<TransactionDB>) -> Self {
        Events { db }
    }

    pub fn create(&self, req: CreateEventRequest) -> Result<Event> {
        let tx = self.db.transaction();

        let id = next_seq(&tx, make_id_seq_key(NAMESPACE))?;
        let event = Event {
            id,
            created_at: Utc::now(),
            created_by: req.created_by,
            updated_at: None,
            updated_by: None,
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

        let data = serialize(&event)?;
        tx.put(make_data_value_key(NAMESPACE, id), data)?;
        tx.commit()?;

        Ok(event)
    }

    pub fn get_by_id(&self, id: u64) -> Result<Event> {
        let tx = self.db.transaction();

        get_by_id_(&tx, id)
    }

    pub fn list(&self) -> Result<ListResponse<Event>> {
        let tx = self.db.transaction();

        list_data(&tx, NAMESPACE)
    }

    pub fn update(&self, id: u64, req: UpdateEventRequest) -> Result<Event> {
        let tx = self.db.transaction();

        let mut event = lock_(&tx, id)?;

        req.title.apply(&mut event.title);
        req.description.apply(&mut event.description);
        req.location.apply(&mut event.location);
        req.starts_at.apply(&mut event.starts_at);
        req.is_published.apply(&mut event.is_published);
        req.is_highlighted.apply(&mut event.is_highlighted);
        req.exclusive_for_members
            .apply(&mut event.exclusive_for_members);
        req.vacancy_total.apply(&mut event.vacancy_total);
        req.vacancy_online.apply(&mut event.vacancy_online);
        req.vacancies_per_brand
            .apply(&mut event.vacancies_per_brand);
        req.free_online.apply(&mut event.free_online);
        event.updated_at = Some(Utc::now());
        event.updated_by = Some(req.updated_by);

        let data = serialize(&event)?;
        tx.put(make_data_value_key(NAMESPACE, id), data)?;
        tx.commit()?;

        Ok(event)
    }

    /// Deletes the event together with its attendance list.
    pub fn delete(&self, id: u64) -> Result<Event> {
        let tx = self.db.transaction();

        let event = lock_(&tx, id)?;
        tx.delete(make_data_value_key(NAMESPACE, id))?;
        let removed = attendance::delete_by_event_(&tx, id)?;
        tx.commit()?;
        debug!("event {id} deleted with {removed} attendance records");

        Ok(event)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
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
    /// In-person capacity.
    pub vacancy_total: u32,
    pub vacancy_online: u32,
    pub vacancies_per_brand: u32,
    /// Online registrations don't count against `vacancies_per_brand`.
    pub free_online: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateEventRequest {
    pub created_by: u64,
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

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UpdateEventRequest {
    pub updated_by: u64,
    pub title: OptionalProperty<String>,
    pub description: OptionalProperty<Option<String>>,
    pub location: OptionalProperty<Option<String>>,
    pub starts_at: OptionalProperty<DateTime<Utc>>,
    pub is_published: OptionalProperty<bool>,
    pub is_highlighted: OptionalProperty<bool>,
    pub exclusive_for_members: OptionalProperty<bool>,
    pub vacancy_total: OptionalProperty<u32>,
    pub vacancy_online: OptionalProperty<u32>,
    pub vacancies_per_brand: OptionalProperty<u32>,
    pub free_online: OptionalProperty<bool>,
}
