use std::path::Path;

use rocksdb::ColumnFamilyDescriptor;
use rocksdb::Options;
use rocksdb::TransactionDB;
use rocksdb::TransactionDBOptions;

use crate::Result;

/// How long a transaction waits for a row lock (e.g. the per-event
/// registration lock) before giving up with `Busy`/`TimedOut`.
const TXN_LOCK_TIMEOUT_MS: i64 = 5000;

enum ColumnFamily {
    General,
}

fn cf_descriptor(cf: ColumnFamily, opts: Options) -> ColumnFamilyDescriptor {
    match cf {
        ColumnFamily::General => ColumnFamilyDescriptor::new("general", opts),
    }
}

pub fn new<P: AsRef<Path>>(path: P) -> Result<TransactionDB> {
    let mut opts = Options::default();

    opts.create_if_missing(true);
    opts.create_missing_column_families(true);

    let cf_descriptors = vec![cf_descriptor(ColumnFamily::General, opts.clone())];
    let mut txopts = TransactionDBOptions::default();
    txopts.set_txn_lock_timeout(TXN_LOCK_TIMEOUT_MS);

    Ok(TransactionDB::open_cf_descriptors(
        &opts,
        &txopts,
        path,
        cf_descriptors,
    )?)
}
