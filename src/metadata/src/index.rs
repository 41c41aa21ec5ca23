use rocksdb::Transaction;
use rocksdb::TransactionDB;

use crate::error::MetadataError;
use crate::Result;

pub fn check_insert_constraints(
    tx: &Transaction<TransactionDB>,
    keys: &[Option<Vec<u8>>],
) -> Result<()> {
    for key in keys.iter().flatten() {
        // exclusive lock so two transactions can't both pass the check
        if tx.get_for_update(key, true)?.is_some() {
            return Err(MetadataError::AlreadyExists(String::from_utf8_lossy(key).to_string()));
        }
    }
    Ok(())
}

pub fn insert_index(
    tx: &Transaction<TransactionDB>,
    keys: &[Option<Vec<u8>>],
    id: u64,
) -> Result<()> {
    for key in keys.iter().flatten() {
        tx.put(key, id.to_le_bytes())?;
    }
    Ok(())
}

pub fn check_update_constraints(
    tx: &Transaction<TransactionDB>,
    keys: &[Option<Vec<u8>>],
    prev_keys: &[Option<Vec<u8>>],
) -> Result<()> {
    for (key, prev_key) in keys.iter().zip(prev_keys) {
        if let Some(key_v) = key {
            if key != prev_key && tx.get_for_update(key_v, true)?.is_some() {
                return Err(MetadataError::AlreadyExists(
                    String::from_utf8_lossy(key_v).to_string(),
                ));
            }
        }
    }

    Ok(())
}

pub fn update_index(
    tx: &Transaction<TransactionDB>,
    keys: &[Option<Vec<u8>>],
    prev_keys: &[Option<Vec<u8>>],
    value: u64,
) -> Result<()> {
    for (key, prev_key) in keys.iter().zip(prev_keys) {
        if key != prev_key {
            if let Some(key) = prev_key {
                tx.delete(key)?;
            }
        }

        if let Some(key) = key {
            tx.put(key, value.to_le_bytes())?;
        }
    }

    Ok(())
}

pub fn delete_index(tx: &Transaction<TransactionDB>, keys: &[Option<Vec<u8>>]) -> Result<()> {
    for key in keys.iter().flatten() {
        tx.delete(key)?;
    }
    Ok(())
}

pub fn get_index<K>(
    tx: &Transaction<TransactionDB>,
    key: K,
    err_key: impl ToString,
) -> Result<u64>
where
    K: AsRef<[u8]>,
{
    match tx.get(key.as_ref())? {
        None => Err(MetadataError::NotFound(err_key.to_string())),
        Some(v) => decode_id(v),
    }
}

pub fn next_seq<K: AsRef<[u8]>>(tx: &Transaction<TransactionDB>, key: K) -> Result<u64> {
    let id = tx.get_for_update(key.as_ref(), true)?;
    let result: u64 = match id {
        Some(v) => decode_id(v)? + 1,
        None => 1,
    };
    tx.put(key, result.to_le_bytes())?;

    Ok(result)
}

pub(crate) fn decode_id(v: Vec<u8>) -> Result<u64> {
    let bytes: [u8; 8] = v
        .try_into()
        .map_err(|_| MetadataError::Internal("malformed id value".to_string()))?;

    Ok(u64::from_le_bytes(bytes))
}
