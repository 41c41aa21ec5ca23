use chrono::Duration;
use chrono::Utc;
use common::rbac::Role;
use common::types::OptionalProperty;
use platform::events::CreateEventRequest;
use platform::events::Event;
use platform::events::UpdateEventRequest;
use platform::ListResponse;
use reqwest::Client;
use reqwest::StatusCode;

use crate::assert_response_json_eq;
use crate::assert_response_status_eq;
use crate::http::tests::create_acc_and_login;
use crate::http::tests::create_admin_acc_and_login;
use crate::http::tests::json_headers;
use crate::http::tests::run_http_service;
use crate::http::tests::EMPTY_LIST;

fn assert(l: &Event, r: &Event) {
    assert_eq!(l.id, r.id);
    assert_eq!(l.title, r.title);
    assert_eq!(l.starts_at, r.starts_at);
    assert_eq!(l.is_published, r.is_published);
    assert_eq!(l.is_highlighted, r.is_highlighted);
    assert_eq!(l.exclusive_for_members, r.exclusive_for_members);
    assert_eq!(l.vacancy_total, r.vacancy_total);
    assert_eq!(l.vacancy_online, r.vacancy_online);
    assert_eq!(l.vacancies_per_brand, r.vacancies_per_brand);
    assert_eq!(l.free_online, r.free_online);
}

#[tokio::test]
async fn test_events() {
    let (base_url, md, pp) = run_http_service().await.unwrap();
    let events_url = format!("{base_url}/events");
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

    // list without events should be empty
    {
        let resp = cl
            .get(&events_url)
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_response_json_eq!(resp, EMPTY_LIST.to_string());
    }

    let create_req = CreateEventRequest {
        title: "Franchise Summit".to_string(),
        description: Some("yearly meeting".to_string()),
        location: Some("Expo Center".to_string()),
        starts_at: Utc::now() + Duration::days(30),
        is_published: false,
        is_highlighted: false,
        exclusive_for_members: true,
        vacancy_total: 100,
        vacancy_online: 500,
        vacancies_per_brand: 3,
        free_online: true,
    };

    // members can't manage events
    {
        let resp = cl
            .post(&events_url)
            .body(serde_json::to_string(&create_req).unwrap())
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::FORBIDDEN);
    }

    let created: Event = {
        let resp = cl
            .post(&events_url)
            .body(serde_json::to_string(&create_req).unwrap())
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    };
    assert_eq!(created.title, create_req.title);
    assert!(!created.is_published);

    // drafts are hidden from everyone without ViewEvents
    {
        let resp = cl
            .get(format!("{events_url}/{}", created.id))
            .headers(member_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::NOT_FOUND);
    }

    {
        let resp = cl
            .get(&events_url)
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_response_json_eq!(resp, EMPTY_LIST.to_string());
    }

    {
        let resp = cl
            .get(format!("{events_url}/{}", created.id))
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let event: Event = resp.json().await.unwrap();
        assert(&event, &created);
    }

    // publishing leaves the highlight flag alone
    let updated: Event = {
        let req = UpdateEventRequest {
            is_published: OptionalProperty::Some(true),
            ..Default::default()
        };
        let resp = cl
            .put(format!("{events_url}/{}", created.id))
            .body(serde_json::to_string(&req).unwrap())
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    };
    assert!(updated.is_published);
    assert!(!updated.is_highlighted);

    {
        let resp = cl
            .get(&events_url)
            .headers(json_headers())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let list: ListResponse<Event> = resp.json().await.unwrap();
        assert_eq!(list.data.len(), 1);
        assert(&list.data[0], &updated);
    }

    {
        let resp = cl
            .delete(format!("{events_url}/{}", created.id))
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::OK);
    }

    {
        let resp = cl
            .get(format!("{events_url}/{}", created.id))
            .headers(admin_headers.clone())
            .send()
            .await
            .unwrap();

        assert_response_status_eq!(resp, StatusCode::NOT_FOUND);
    }
}
