use std::fmt;
use std::sync::Arc;

use bincode::deserialize;
use bincode::serialize;
use chrono::DateTime;
use chrono::Utc;
use rocksdb::Transaction;
use rocksdb::TransactionDB;
use serde::Deserialize;
use serde::Serialize;

use crate::error::MetadataError;
use crate::events;
use crate::events::Event;
use crate::index::check_insert_constraints;
use crate::index::decode_id;
use crate::index::delete_index;
use crate::index::insert_index;
use crate::index::next_seq;
use crate::make_data_value_key;
use crate::make_id_seq_key;
use crate::make_index_key;
use crate::make_link_key;
use crate::make_link_prefix;
use crate::scan_prefix;
use crate::Result;

const NAMESPACE: &[u8] = b"attendance";
const IDX_EVENT_ACCOUNT: &[u8] = b"event_account";
const LINK_EVENT: &[u8] = b"event";
const LINK_ACCOUNT: &[u8] = b"account";

fn event_account_key(event_id: u64, account_id: u64) -> Vec<u8> {
    make_index_key(
        NAMESPACE,
        IDX_EVENT_ACCOUNT,
        format!("{event_id}/{account_id}").as_str(),
    )
}

fn index_keys(event_id: u64, account_id: u64) -> Vec<Option<Vec<u8>>> {
    [Some(event_account_key(event_id, account_id))].to_vec()
}

fn decode_record(id: u64, value: Option<Vec<u8>>) -> Result<AttendanceRecord> {
    match value {
        None => Err(MetadataError::NotFound(format!(
            "attendance record {id} not found"
        ))),
        Some(value) => Ok(deserialize(&value)?),
    }
}

fn get_by_id_(tx: &Transaction<TransactionDB>, id: u64) -> Result<AttendanceRecord> {
    decode_record(id, tx.get(make_data_value_key(NAMESPACE, id))?)
}

/// Reads the record and holds an exclusive lock on it until `tx` ends.
fn lock_(tx: &Transaction<TransactionDB>, id: u64) -> Result<AttendanceRecord> {
    decode_record(
        id,
        tx.get_for_update(make_data_value_key(NAMESPACE, id), true)?,
    )
}

fn list_linked_(
    tx: &Transaction<TransactionDB>,
    link_name: &[u8],
    owner_id: u64,
) -> Result<Vec<AttendanceRecord>> {
    scan_prefix(tx, make_link_prefix(NAMESPACE, link_name, owner_id).as_slice())?
        .into_iter()
        .map(|(_, v)| get_by_id_(tx, decode_id(v.into_vec())?))
        .collect()
}

fn delete_(tx: &Transaction<TransactionDB>, record: &AttendanceRecord) -> Result<()> {
    tx.delete(make_data_value_key(NAMESPACE, record.id))?;
    tx.delete(make_link_key(
        NAMESPACE,
        LINK_EVENT,
        record.event_id,
        record.id,
    ))?;
    tx.delete(make_link_key(
        NAMESPACE,
        LINK_ACCOUNT,
        record.account_id,
        record.id,
    ))?;
    delete_index(tx, index_keys(record.event_id, record.account_id).as_ref())
}

pub(crate) fn delete_by_event_(tx: &Transaction<TransactionDB>, event_id: u64) -> Result<usize> {
    let records = list_linked_(tx, LINK_EVENT, event_id)?;
    for record in records.iter() {
        delete_(tx, record)?;
    }

    Ok(records.len())
}

/// Attendance lists. A record is unique per (event, account).
pub struct Attendance {
    db: Arc<TransactionDB>,
}

impl Attendance {
    pub fn new(db: Arc<TransactionDB>) -> Self {
        Attendance { db }
    }

    /// Creates a record if `guard` accepts it.
    ///
    /// Runs in one transaction that holds the event's lock from the moment the
    /// attendance list is read until the new record is committed, so the
    /// counts `guard` decides on can't go stale. `guard` gets the event and
    /// its current attendance list and returns the record to insert. A record
    /// that already exists for the pair is reported as
    /// [`MetadataError::AlreadyExists`].
    pub fn create_guarded<F, E>(
        &self,
        event_id: u64,
        guard: F,
    ) -> std::result::Result<AttendanceRecord, E>
    where
        F: FnOnce(&Event, &[AttendanceRecord]) -> std::result::Result<CreateAttendanceRequest, E>,
        E: From<MetadataError>,
    {
        let tx = self.db.transaction();

        let event = events::lock_(&tx, event_id)?;
        let list = list_linked_(&tx, LINK_EVENT, event_id)?;
        let req = guard(&event, &list)?;

        let idx_keys = index_keys(event_id, req.account_id);
        check_insert_constraints(&tx, idx_keys.as_ref())?;

        let id = next_seq(&tx, make_id_seq_key(NAMESPACE))?;
        let record = req.into_record(id, event_id, Utc::now());

        let data = serialize(&record).map_err(MetadataError::from)?;
        tx.put(make_data_value_key(NAMESPACE, id), data)
            .map_err(MetadataError::from)?;
        tx.put(
            make_link_key(NAMESPACE, LINK_EVENT, event_id, id),
            id.to_le_bytes(),
        )
        .map_err(MetadataError::from)?;
        tx.put(
            make_link_key(NAMESPACE, LINK_ACCOUNT, record.account_id, id),
            id.to_le_bytes(),
        )
        .map_err(MetadataError::from)?;
        insert_index(&tx, idx_keys.as_ref(), id)?;

        tx.commit().map_err(MetadataError::from)?;

        Ok(record)
    }

    pub fn get_by_id(&self, id: u64) -> Result<AttendanceRecord> {
        let tx = self.db.transaction();

        get_by_id_(&tx, id)
    }

    pub fn find(&self, event_id: u64, account_id: u64) -> Result<Option<AttendanceRecord>> {
        let tx = self.db.transaction();

        match tx.get(event_account_key(event_id, account_id))? {
            None => Ok(None),
            Some(v) => Ok(Some(get_by_id_(&tx, decode_id(v)?)?)),
        }
    }

    pub fn list_by_event(&self, event_id: u64) -> Result<Vec<AttendanceRecord>> {
        let tx = self.db.transaction();

        list_linked_(&tx, LINK_EVENT, event_id)
    }

    pub fn list_by_account(&self, account_id: u64) -> Result<Vec<AttendanceRecord>> {
        let tx = self.db.transaction();

        list_linked_(&tx, LINK_ACCOUNT, account_id)
    }

    pub fn set_checked_in(
        &self,
        id: u64,
        checked_in: bool,
        by: u64,
    ) -> Result<AttendanceRecord> {
        let tx = self.db.transaction();

        let mut record = lock_(&tx, id)?;

        record.checked_in = checked_in;
        if checked_in {
            record.checked_in_at = Some(Utc::now());
            record.checked_in_by = Some(by);
        } else {
            record.checked_in_at = None;
            record.checked_in_by = None;
        }

        tx.put(make_data_value_key(NAMESPACE, id), serialize(&record)?)?;
        tx.commit()?;

        Ok(record)
    }

    /// Concurrent deletes of one record serialize on its lock; only the
    /// first succeeds.
    pub fn delete(&self, id: u64) -> Result<AttendanceRecord> {
        let tx = self.db.transaction();

        let record = lock_(&tx, id)?;
        delete_(&tx, &record)?;
        tx.commit()?;

        Ok(record)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMode {
    InPerson,
    Online,
}

impl fmt::Display for AttendanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceMode::InPerson => write!(f, "in person"),
            AttendanceMode::Online => write!(f, "online"),
        }
    }
}

/// One registration. Registrant and company fields are a snapshot taken
/// when the record was created; later profile edits don't touch them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub event_id: u64,
    pub account_id: u64,
    pub company_id: Option<u64>,
    pub mode: AttendanceMode,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub company_tax_id: Option<String>,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateAttendanceRequest {
    pub account_id: u64,
    pub company_id: Option<u64>,
    pub mode: AttendanceMode,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub company_tax_id: Option<String>,
}

impl CreateAttendanceRequest {
    pub fn into_record(self, id: u64, event_id: u64, created_at: DateTime<Utc>) -> AttendanceRecord {
        AttendanceRecord {
            id,
            created_at,
            event_id,
            account_id: self.account_id,
            company_id: self.company_id,
            mode: self.mode,
            name: self.name,
            email: self.email,
            position: self.position,
            document: self.document,
            phone: self.phone,
            company_name: self.company_name,
            company_tax_id: self.company_tax_id,
            checked_in: false,
            checked_in_at: None,
            checked_in_by: None,
        }
    }
}
