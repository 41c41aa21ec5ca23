use std::env::temp_dir;
use std::sync::Arc;

use metadata::companies::normalize_tax_id;
use metadata::companies::Companies;
use metadata::companies::CreateCompanyRequest;
use metadata::companies::UpdateCompanyRequest;
use metadata::error::MetadataError;
use metadata::error::Result;
use uuid::Uuid;

#[test]
fn test_normalize_tax_id() {
    assert_eq!(normalize_tax_id("12.345.678/0001-90"), "12345678000190");
    assert_eq!(normalize_tax_id(" ab-12 "), "ab12");
}

#[test]
fn test_companies() -> Result<()> {
    let mut path = temp_dir();
    path.push(format!("{}.db", Uuid::new_v4()));

    let db = Arc::new(metadata::rocksdb::new(path)?);
    let companies = Companies::new(db.clone());

    assert!(companies.get_by_id(1).is_err());
    assert!(companies.delete(1).is_err());

    let c1 = companies.create(CreateCompanyRequest {
        created_by: 1,
        tax_id: "12.345.678/0001-90".to_string(),
        name: "Brand One".to_string(),
        active: true,
    })?;
    assert_eq!(c1.id, 1);
    assert_eq!(c1.tax_id, "12345678000190");

    // same tax id, different punctuation
    assert!(matches!(
        companies.create(CreateCompanyRequest {
            created_by: 1,
            tax_id: "12345678000190".to_string(),
            name: "Brand Copy".to_string(),
            active: false,
        }),
        Err(MetadataError::AlreadyExists(_))
    ));

    let c2 = companies.create(CreateCompanyRequest {
        created_by: 1,
        tax_id: "99".to_string(),
        name: "Brand Two".to_string(),
        active: false,
    })?;

    assert_eq!(companies.get_by_tax_id("12345678/0001-90")?.id, c1.id);
    assert_eq!(companies.list()?.data, vec![c1.clone(), c2.clone()]);

    let mut req = UpdateCompanyRequest {
        updated_by: 1,
        ..Default::default()
    };
    req.tax_id.insert("12345678000190".to_string());
    assert!(companies.update(c2.id, req).is_err());

    let mut req = UpdateCompanyRequest {
        updated_by: 1,
        ..Default::default()
    };
    req.active.insert(true);
    req.tax_id.insert("98".to_string());
    let c2 = companies.update(c2.id, req)?;
    assert!(c2.active);
    assert_eq!(c2.name, "Brand Two");
    assert!(companies.get_by_tax_id("99").is_err());
    assert_eq!(companies.get_by_tax_id("98")?.id, c2.id);

    companies.delete(c1.id)?;
    assert!(companies.get_by_tax_id("12345678000190").is_err());
    assert_eq!(companies.list()?.data.len(), 1);

    Ok(())
}
