use common::rbac::Role;
use platform::registrations::Attendance;
use platform::registrations::DenialReason;
use platform::ListResponse;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

use crate::assert_response_status_eq;
use crate::http::tests::create_acc_and_login;
use crate::http::tests::create_admin_acc_and_login;
use crate::http::tests::create_event;
use crate::http::tests::json_headers;
use crate::http::tests::run_http_service;

#[tokio::test]
async fn test_registrations() {
    let (base_url, md, pp) = run_http_service().await.unwrap();
    let cl = Client::new();
    let admin_headers = create_admin_acc_and_login(&pp.auth, &md.accounts)
        .await
        .unwrap();
    let member_headers = create_acc_and_login(
        &pp.auth,
        &md.accounts,
        "member@mail.com",
        None,
        Role::Member,
    )
    .await
    .unwrap();
    let event_id = create_event(&md, true).unwrap();
    let registration_url = format!("{base_url}/events/{event_id}/registration");

    {
        let resp = cl
            .get(&registration_url)
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "unauthenticated");
        assert_eq!(body["code"], DenialReason::LoginRequired.code());
    }

    {
        let resp = cl
            .get(&registration_url)
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "eligible");
        assert_eq!(body["canRegisterPresential"], true);
        assert_eq!(body["remainingPresential"], 2);
        assert_eq!(body["registrant"]["email"], "member@mail.com");
    }

    {
        let resp = cl
            .post(&registration_url)
            .body(json!({"mode": "in_person"}).to_string())
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], DenialReason::LoginRequired.code());
    }

    let attendance: Attendance = {
        let resp = cl
            .post(&registration_url)
            .body(json!({"mode": "in_person"}).to_string())
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    };
    assert_eq!(attendance.event_id, event_id);
    assert_eq!(attendance.name, "John Doe");

    {
        let resp = cl
            .post(&registration_url)
            .body(json!({"mode": "online"}).to_string())
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], platform::error::ALREADY_REGISTERED_CODE);
        assert_eq!(
            body["error"]["fields"]["attendanceId"],
            attendance.id.to_string()
        );
    }

    {
        let resp = cl
            .get(&registration_url)
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "alreadyRegistered");
        assert_eq!(body["attendanceId"], attendance.id);
    }

    {
        let resp = cl
            .get(format!("{base_url}/auth/registrations"))
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let list: ListResponse<Attendance> = resp.json().await.unwrap();
        assert_eq!(list.data, vec![attendance.clone()]);
    }

    // attendance list and check-in are staff-only
    {
        let resp = cl
            .get(format!("{base_url}/events/{event_id}/attendance"))
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::FORBIDDEN);
    }

    {
        let resp = cl
            .put(format!("{base_url}/attendance/{}/check-in", attendance.id))
            .body(json!({"checkedIn": true}).to_string())
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::FORBIDDEN);
    }

    {
        let resp = cl
            .put(format!("{base_url}/attendance/{}/check-in", attendance.id))
            .body(json!({"checkedIn": true}).to_string())
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let checked: Attendance = resp.json().await.unwrap();
        assert!(checked.checked_in);
    }

    {
        let resp = cl
            .get(format!("{base_url}/events/{event_id}/attendance"))
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let list: ListResponse<Attendance> = resp.json().await.unwrap();
        assert_eq!(list.data.len(), 1);
        assert!(list.data[0].checked_in);
    }

    {
        let resp = cl
            .delete(format!("{base_url}/attendance/{}", attendance.id))
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::OK);
    }

    // drafts can't be registered for
    let draft_id = create_event(&md, false).unwrap();
    {
        let resp = cl
            .post(format!("{base_url}/events/{draft_id}/registration"))
            .body(json!({"mode": "online"}).to_string())
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], DenialReason::NotPublished.code());
    }

    {
        let resp = cl
            .get(format!("{base_url}/events/{}/registration", draft_id + 10))
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::NOT_FOUND);
    }
}
