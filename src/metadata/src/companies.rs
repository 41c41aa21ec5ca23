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

use crate::error::MetadataError;
use crate::index::check_insert_constraints;
use crate::index::check_update_constraints;
use crate::index::delete_index;
use crate::index::get_index;
use crate::index::insert_index;
use crate::index::next_seq;
use crate::index::update_index;
use crate::list_data;
use crate::make_data_value_key;
use crate::make_id_seq_key;
use crate::make_index_key;
use crate::metadata::ListResponse;
use crate::Result;

const NAMESPACE: &[u8] = b"companies";
const IDX_TAX_ID: &[u8] = b"tax_id";

/// Tax ids are compared by their digits only, so "12.345.678/0001-90" and
/// "12345678000190" are the same company.
pub fn normalize_tax_id(tax_id: &str) -> String {
    tax_id.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn index_keys(tax_id: &str) -> Vec<Option<Vec<u8>>> {
    [index_tax_id_key(tax_id)].to_vec()
}

fn index_tax_id_key(tax_id: &str) -> Option<Vec<u8>> {
    Some(make_index_key(NAMESPACE, IDX_TAX_ID, normalize_tax_id(tax_id).as_str()).to_vec())
}

pub struct Companies {
    db: Arc<TransactionDB>,
}

impl Companies {
    pub fn new(db: Arc<TransactionDB>) -> Self {
        Companies { db }
    }

    fn get_by_id_(&self, tx: &Transaction<TransactionDB>, id: u64) -> Result<Company> {
        let key = make_data_value_key(NAMESPACE, id);

        match tx.get(key)? {
            None => Err(MetadataError::NotFound(format!("company {id} not found"))),
            Some(value) => Ok(deserialize(&value)?),
        }
    }

    pub fn create(&self, req: CreateCompanyRequest) -> Result<Company> {
        let tx = self.db.transaction();

        let idx_keys = index_keys(&req.tax_id);
        check_insert_constraints(&tx, idx_keys.as_ref())?;

        let created_at = Utc::now();
        let id = next_seq(&tx, make_id_seq_key(NAMESPACE))?;

        let company = Company {
            id,
            created_at,
            created_by: req.created_by,
            updated_at: None,
            updated_by: None,
            tax_id: normalize_tax_id(&req.tax_id),
            name: req.name,
            active: req.active,
        };

        let data = serialize(&company)?;
        tx.put(make_data_value_key(NAMESPACE, id), data)?;

        insert_index(&tx, idx_keys.as_ref(), id)?;
        tx.commit()?;
        Ok(company)
    }

    pub fn get_by_id(&self, id: u64) -> Result<Company> {
        let tx = self.db.transaction();

        self.get_by_id_(&tx, id)
    }

    pub fn get_by_tax_id(&self, tax_id: &str) -> Result<Company> {
        let tx = self.db.transaction();
        let id = get_index(
            &tx,
            make_index_key(NAMESPACE, IDX_TAX_ID, normalize_tax_id(tax_id).as_str()),
            format!("company with tax id \"{tax_id}\" not found"),
        )?;

        self.get_by_id_(&tx, id)
    }

    pub fn list(&self) -> Result<ListResponse<Company>> {
        let tx = self.db.transaction();

        list_data(&tx, NAMESPACE)
    }

    pub fn update(&self, id: u64, req: UpdateCompanyRequest) -> Result<Company> {
        let tx = self.db.transaction();

        let prev_company = self.get_by_id_(&tx, id)?;

        let mut company = prev_company.clone();

        let mut idx_keys: Vec<Option<Vec<u8>>> = Vec::new();
        let mut idx_prev_keys: Vec<Option<Vec<u8>>> = Vec::new();
        if let OptionalProperty::Some(tax_id) = &req.tax_id {
            idx_keys.push(index_tax_id_key(tax_id.as_str()));
            idx_prev_keys.push(index_tax_id_key(prev_company.tax_id.as_str()));
            company.tax_id = normalize_tax_id(tax_id);
        }

        check_update_constraints(&tx, idx_keys.as_ref(), idx_prev_keys.as_ref())?;

        req.name.apply(&mut company.name);
        req.active.apply(&mut company.active);
        company.updated_at = Some(Utc::now());
        company.updated_by = Some(req.updated_by);

        let data = serialize(&company)?;
        tx.put(make_data_value_key(NAMESPACE, company.id), data)?;

        update_index(&tx, idx_keys.as_ref(), idx_prev_keys.as_ref(), company.id)?;
        tx.commit()?;
        Ok(company)
    }

    pub fn delete(&self, id: u64) -> Result<Company> {
        let tx = self.db.transaction();

        let company = self.get_by_id_(&tx, id)?;
        tx.delete(make_data_value_key(NAMESPACE, id))?;

        delete_index(&tx, index_keys(&company.tax_id).as_ref())?;
        tx.commit()?;
        Ok(company)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<u64>,
    pub tax_id: String,
    pub name: String,
    /// Holds an active association membership.
    pub active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateCompanyRequest {
    pub created_by: u64,
    pub tax_id: String,
    pub name: String,
    pub active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UpdateCompanyRequest {
    pub updated_by: u64,
    pub tax_id: OptionalProperty<String>,
    pub name: OptionalProperty<String>,
    pub active: OptionalProperty<bool>,
}
