pub mod accounts;
pub mod attendance;
pub mod companies;
pub mod error;
pub mod events;
pub mod index;
pub mod metadata;
pub mod rocksdb;

use ::rocksdb::Direction;
use ::rocksdb::IteratorMode;
use ::rocksdb::Transaction;
use ::rocksdb::TransactionDB;
use bincode::deserialize;
pub use error::Result;
use serde::de::DeserializeOwned;

pub use crate::metadata::MetadataProvider;
use crate::metadata::ListResponse;
use crate::metadata::ResponseMetadata;

// ids are big-endian inside keys so that prefix scans come back in id order

pub fn make_data_value_key(ns: &[u8], id: u64) -> Vec<u8> {
    [ns, b"/data/", id.to_be_bytes().as_ref()].concat()
}

pub fn make_data_key(ns: &[u8]) -> Vec<u8> {
    [ns, b"/data/"].concat()
}

pub fn make_index_key(ns: &[u8], idx_name: &[u8], key: &str) -> Vec<u8> {
    [ns, b"/idx/", idx_name, b"/", key.as_bytes()].concat()
}

pub fn make_id_seq_key(ns: &[u8]) -> Vec<u8> {
    [ns, b"/id_seq"].concat()
}

/// Prefix of a one-to-many link, e.g. all attendance ids of one event.
pub fn make_link_prefix(ns: &[u8], link_name: &[u8], owner_id: u64) -> Vec<u8> {
    [ns, b"/", link_name, b"/", owner_id.to_be_bytes().as_ref(), b"/"].concat()
}

pub fn make_link_key(ns: &[u8], link_name: &[u8], owner_id: u64, id: u64) -> Vec<u8> {
    [
        make_link_prefix(ns, link_name, owner_id).as_slice(),
        id.to_be_bytes().as_ref(),
    ]
    .concat()
}

pub(crate) fn scan_prefix(
    tx: &Transaction<TransactionDB>,
    prefix: &[u8],
) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
    let mut out = Vec::new();
    for item in tx.iterator(IteratorMode::From(prefix, Direction::Forward)) {
        let (key, value) = item?;
        if !key.starts_with(prefix) {
            break;
        }
        out.push((key, value));
    }

    Ok(out)
}

pub fn list_data<T>(tx: &Transaction<TransactionDB>, ns: &[u8]) -> Result<ListResponse<T>>
where T: DeserializeOwned {
    let data = scan_prefix(tx, make_data_key(ns).as_slice())?
        .iter()
        .map(|(_, v)| deserialize(v.as_ref()))
        .collect::<bincode::Result<_>>()?;

    Ok(ListResponse {
        data,
        meta: ResponseMetadata { next: None },
    })
}
