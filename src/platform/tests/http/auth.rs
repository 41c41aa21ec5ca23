use metadata::companies::CreateCompanyRequest;
use platform::accounts::Account;
use platform::auth::SignUpRequest;
use platform::auth::TokensResponse;
use platform::http::auth::RefreshTokenRequest;
use reqwest::header::HeaderValue;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

use crate::assert_response_status_eq;
use crate::http::tests::json_headers;
use crate::http::tests::run_http_service;
use crate::http::tests::STRONG_PASSWORD;

fn sign_up_request(email: &str, password: &str, company_tax_id: Option<&str>) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: password.to_string(),
        password_repeat: password.to_string(),
        first_name: Some("Ana".to_string()),
        last_name: Some("Silva".to_string()),
        company_tax_id: company_tax_id.map(|v| v.to_string()),
        position: Some("Manager".to_string()),
        document: None,
        phone: Some("+55 11 5555-0000".to_string()),
    }
}

#[tokio::test]
async fn test_auth() {
    let (base_addr, md, _pp) = run_http_service().await.unwrap();
    let auth_addr = format!("{base_addr}/auth");
    let cl = Client::new();

    let company = md
        .companies
        .create(CreateCompanyRequest {
            created_by: 1,
            tax_id: "12.345.678/0001-90".to_string(),
            name: "Coffee Brand".to_string(),
            active: true,
        })
        .unwrap();

    // weak password
    {
        let req = sign_up_request("user@mail.com", "password", None);
        let resp = cl
            .post(format!("{auth_addr}/signup"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"]["fields"]["password"].is_string());
    }

    // unknown company
    {
        let req = sign_up_request("user@mail.com", STRONG_PASSWORD, Some("999"));
        let resp = cl
            .post(format!("{auth_addr}/signup"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"]["fields"]["companyTaxId"].is_string());
    }

    let tokens: TokensResponse = {
        let req = sign_up_request("user@mail.com", STRONG_PASSWORD, Some("12345678000190"));
        let resp = cl
            .post(format!("{auth_addr}/signup"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    };

    // same email, different case
    {
        let req = sign_up_request("USER@mail.com", STRONG_PASSWORD, None);
        let resp = cl
            .post(format!("{auth_addr}/signup"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::CONFLICT);
    }

    let mut headers = json_headers();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(format!("Bearer {}", tokens.access_token).as_str()).unwrap(),
    );

    // profile
    {
        let resp = cl
            .get(format!("{auth_addr}/profile"))
            .headers(headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let acc: Account = resp.json().await.unwrap();
        assert_eq!(acc.email, "user@mail.com");
        assert_eq!(acc.company_id, Some(company.id));
        assert_eq!(acc.role, Some(common::rbac::Role::Member));
    }

    {
        let resp = cl
            .put(format!("{auth_addr}/profile"))
            .body(json!({"position": "Director", "phone": null}).to_string())
            .headers(headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let acc: Account = resp.json().await.unwrap();
        assert_eq!(acc.position, Some("Director".to_string()));
        assert_eq!(acc.phone, None);
        assert_eq!(acc.first_name, Some("Ana".to_string()));
    }

    // no token
    {
        let resp = cl
            .get(format!("{auth_addr}/profile"))
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::UNAUTHORIZED);
    }

    // login
    {
        let resp = cl
            .post(format!("{auth_addr}/login"))
            .body(json!({"email": "user@mail.com", "password": "wrong"}).to_string())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::UNAUTHORIZED);
    }

    {
        let resp = cl
            .post(format!("{auth_addr}/login"))
            .body(json!({"email": "user@mail.com", "password": STRONG_PASSWORD}).to_string())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let _tokens: TokensResponse = resp.json().await.unwrap();
    }

    // refresh through the body
    {
        let req = RefreshTokenRequest {
            refresh_token: Some(tokens.refresh_token.clone()),
        };
        let resp = cl
            .post(format!("{auth_addr}/refresh-token"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let _tokens: TokensResponse = resp.json().await.unwrap();
    }

    {
        let req = RefreshTokenRequest {
            refresh_token: Some("garbage".to_string()),
        };
        let resp = cl
            .post(format!("{auth_addr}/refresh-token"))
            .body(serde_json::to_string(&req).unwrap())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::UNAUTHORIZED);
    }
}
