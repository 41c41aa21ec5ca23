use common::rbac::Role;
use platform::accounts::Account;
use platform::accounts::CreateAccountRequest;
use platform::companies::Company;
use platform::companies::CreateCompanyRequest;
use reqwest::Client;
use reqwest::StatusCode;

use crate::assert_response_status_eq;
use crate::http::tests::create_acc_and_login;
use crate::http::tests::create_admin_acc_and_login;
use crate::http::tests::run_http_service;

#[tokio::test]
async fn test_accounts_and_companies() {
    let (base_url, md, pp) = run_http_service().await.unwrap();
    let cl = Client::new();
    let admin_headers = create_admin_acc_and_login(&pp.auth, &md.accounts)
        .await
        .unwrap();
    let staff_headers = create_acc_and_login(
        &pp.auth,
        &md.accounts,
        "staff@mail.com",
        None,
        Role::Staff,
    )
    .await
    .unwrap();

    let company_req = CreateCompanyRequest {
        tax_id: "12.345.678/0001-90".to_string(),
        name: "Coffee Brand".to_string(),
        active: true,
    };

    // staff can read but not write
    {
        let resp = cl
            .post(format!("{base_url}/companies"))
            .body(serde_json::to_string(&company_req).unwrap())
            .headers(staff_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::FORBIDDEN);
    }

    let company: Company = {
        let resp = cl
            .post(format!("{base_url}/companies"))
            .body(serde_json::to_string(&company_req).unwrap())
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    };
    assert_eq!(company.tax_id, "12345678000190");

    // tax ids are unique after normalization
    {
        let req = CreateCompanyRequest {
            tax_id: "12345678000190".to_string(),
            name: "Copycat".to_string(),
            active: false,
        };
        let resp = cl
            .post(format!("{base_url}/companies"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::CONFLICT);
    }

    {
        let resp = cl
            .get(format!("{base_url}/companies/{}", company.id))
            .headers(staff_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let got: Company = resp.json().await.unwrap();
        assert_eq!(got, company);
    }

    let account: Account = {
        let req = CreateAccountRequest {
            password: "some password".to_string(),
            email: "franchisee@mail.com".to_string(),
            first_name: Some("Bea".to_string()),
            last_name: None,
            company_id: Some(company.id),
            position: None,
            document: None,
            phone: None,
            force_update_password: false,
            role: Some(Role::Member),
        };
        let resp = cl
            .post(format!("{base_url}/accounts"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    };
    assert_eq!(account.company_id, Some(company.id));

    {
        let resp = cl
            .get(format!("{base_url}/accounts/{}", account.id))
            .headers(staff_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let got: Account = resp.json().await.unwrap();
        assert_eq!(got, account);
    }

    {
        let resp = cl
            .delete(format!("{base_url}/accounts/{}", account.id))
            .headers(staff_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::FORBIDDEN);
    }

    {
        let resp = cl
            .delete(format!("{base_url}/accounts/{}", account.id))
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::OK);
    }
}
