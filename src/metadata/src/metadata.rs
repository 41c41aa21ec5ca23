use std::sync::Arc;

use rocksdb::TransactionDB;
use serde::Deserialize;
use serde::Serialize;

use crate::accounts::Accounts;
use crate::attendance::Attendance;
use crate::companies::Companies;
use crate::events::Events;
use crate::Result;

pub struct MetadataProvider {
    pub accounts: Arc<Accounts>,
    pub companies: Arc<Companies>,
    pub events: Arc<Events>,
    pub attendance: Arc<Attendance>,
}

impl MetadataProvider {
    pub fn try_new(db: Arc<TransactionDB>) -> Result<Self> {
        Ok(MetadataProvider {
            accounts: Arc::new(Accounts::new(db.clone())),
            companies: Arc::new(Companies::new(db.clone())),
            events: Arc::new(Events::new(db.clone())),
            attendance: Arc::new(Attendance::new(db)),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub next: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: ResponseMetadata,
}
