//! End-to-end tests for the blocking facade against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background
//! thread, then drives `ContactHub` over real HTTP with `UreqTransport`.
//! This validates request building, the transport, and response parsing
//! together.

use std::time::Duration;

use hub_core::{
    Auth, BaseProperties, ContactHub, Contacts, Customer, Education, ErrorCategory, Event,
    EventContext, EventFilters, GetCustomersOptions, HubClient, HubError, Job, Like, SchoolType,
    UreqTransport,
};

const TOKEN: &str = "integration-token";
const WORKSPACE: &str = "ws-int";
const NODE: &str = "node-int";

/// Start the mock server on a random port and return its base URL.
fn start_mock() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, TOKEN).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn hub_with_token(base_url: &str, token: &str) -> ContactHub<UreqTransport> {
    ContactHub::new(
        HubClient::new(base_url, Auth::new(token, WORKSPACE, NODE)),
        UreqTransport::new(Duration::from_secs(5)),
    )
}

fn hub() -> ContactHub<UreqTransport> {
    hub_with_token(&start_mock(), TOKEN)
}

fn customer(external_id: &str, first_name: &str) -> Customer {
    Customer {
        external_id: Some(external_id.to_string()),
        base: Some(BaseProperties {
            first_name: Some(first_name.to_string()),
            contacts: Some(Contacts {
                email: Some(format!("{external_id}@example.com")),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn customer_lifecycle() {
    let hub = hub();

    let listing = hub.get_all_customers().unwrap();
    assert!(listing.current_elements().is_empty());
    assert_eq!(listing.total_pages(), 0);
    assert!(!listing.has_next_page());

    let created = hub.add_customer(&customer("ada", "Ada")).unwrap();
    let id = created.id.clone().expect("server assigns an id");
    assert_eq!(created.node_id.as_deref(), Some(NODE));
    assert_eq!(created.enabled, Some(true));

    let fetched = hub.get_customer(&id).unwrap();
    assert_eq!(fetched.external_id.as_deref(), Some("ada"));
    assert_eq!(
        fetched.base.as_ref().and_then(|b| b.first_name.as_deref()),
        Some("Ada")
    );

    let mut replacement = fetched.clone();
    if let Some(base) = replacement.base.as_mut() {
        base.last_name = Some("Lovelace".to_string());
    }
    let updated = hub.update_customer(&replacement).unwrap();
    assert_eq!(
        updated.base.as_ref().and_then(|b| b.last_name.as_deref()),
        Some("Lovelace")
    );

    let patch = Customer {
        extra: Some("vip".to_string()),
        ..Default::default()
    };
    let patched = hub.patch_customer(&id, &patch).unwrap();
    assert_eq!(patched.extra.as_deref(), Some("vip"));
    assert_eq!(
        patched.base.as_ref().and_then(|b| b.last_name.as_deref()),
        Some("Lovelace")
    );

    let by_external = hub.get_customer_by_external_id("ada").unwrap();
    assert_eq!(by_external.total_elements(), 1);
    assert_eq!(by_external.current_elements()[0].id.as_deref(), Some(id.as_str()));

    hub.delete_customer(&id).unwrap();
    let err = hub.get_customer(&id).unwrap_err();
    assert!(err.is_not_found(), "expected 404, got {err:?}");
    assert_eq!(err.category(), ErrorCategory::Server);
}

#[test]
fn update_without_id_fails_locally() {
    let hub = hub();
    let err = hub.update_customer(&customer("nobody", "No")).unwrap_err();
    assert!(matches!(err, HubError::Usage(_)));
}

#[test]
fn duplicate_customer_surfaces_server_message() {
    let hub = hub();
    hub.add_customer(&customer("dup", "One")).unwrap();

    match hub.add_customer(&customer("dup", "Two")).unwrap_err() {
        HubError::Server { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Customer already exists");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[test]
fn seven_customers_paged_by_three() {
    let hub = hub();
    for i in 0..7 {
        hub.add_customer(&customer(&format!("p{i}"), "Paged")).unwrap();
    }

    let options = GetCustomersOptions::default().with_size(3);
    let first = hub.get_customers(&options).unwrap();
    assert_eq!(first.current_page_number(), 0);
    assert_eq!(first.total_pages(), 3);
    assert_eq!(first.total_elements(), 7);
    assert_eq!(first.current_elements().len(), 3);
    assert!(first.has_next_page());
    assert!(!first.has_previous_page());

    let second = first.next_page().unwrap();
    assert_eq!(second.current_page_number(), 1);
    assert_eq!(second.current_elements().len(), 3);

    let third = second.next_page().unwrap();
    assert_eq!(third.current_page_number(), 2);
    assert_eq!(third.current_elements().len(), 1);
    assert!(!third.has_next_page());
    assert_eq!(
        third.current_elements()[0].external_id.as_deref(),
        Some("p6")
    );

    assert!(matches!(third.next_page(), Err(HubError::NoNextPage { .. })));

    let back = third.previous_page().unwrap();
    assert_eq!(back.current_page_number(), 1);

    let jumped = first.fetch_page(2).unwrap();
    assert_eq!(jumped.current_elements(), third.current_elements());

    let all = hub.get_customers(&options).unwrap().collect_all().unwrap();
    assert_eq!(all.len(), 7);
}

#[test]
fn likes_jobs_and_educations() {
    let hub = hub();
    let id = hub.add_customer(&customer("sub", "Sub")).unwrap().id.unwrap();

    let like = hub
        .add_like(
            &id,
            &Like {
                id: Some("like-1".to_string()),
                category: Some("music".to_string()),
                name: Some("Jazz".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(like.id.as_deref(), Some("like-1"));

    let renamed = hub
        .update_like(
            &id,
            &Like {
                name: Some("Blues".to_string()),
                ..like.clone()
            },
        )
        .unwrap();
    assert_eq!(renamed.name.as_deref(), Some("Blues"));

    let job = hub
        .add_job(
            &id,
            &Job {
                company_name: Some("Analytical Engines".to_string()),
                job_title: Some("Programmer".to_string()),
                is_current: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    let job_id = job.id.clone().expect("server assigns job ids");

    let education = hub
        .add_education(
            &id,
            &Education {
                school_type: Some(SchoolType::College),
                school_name: Some("Home".to_string()),
                start_year: Some(1830),
                ..Default::default()
            },
        )
        .unwrap();

    let stored = hub.get_customer(&id).unwrap();
    let base = stored.base.expect("base properties");
    assert_eq!(base.likes.as_ref().map(Vec::len), Some(1));
    assert_eq!(base.likes.unwrap()[0].name.as_deref(), Some("Blues"));
    assert_eq!(base.jobs.unwrap()[0].id.as_deref(), Some(job_id.as_str()));
    assert_eq!(base.educations.unwrap()[0].start_year, Some(1830));

    hub.remove_like(&id, "like-1").unwrap();
    hub.remove_job(&id, &job_id).unwrap();
    hub.remove_education(&id, education.id.as_deref().unwrap()).unwrap();

    let err = hub.remove_like(&id, "like-1").unwrap_err();
    assert!(err.is_not_found());

    let err = hub.update_job(&id, &Job::default()).unwrap_err();
    assert!(matches!(err, HubError::Usage(_)));
}

#[test]
fn tags_are_added_once_and_removed() {
    let hub = hub();
    let id = hub.add_customer(&customer("tagged", "Tag")).unwrap().id.unwrap();

    let tagged = hub.add_tag(&id, "vip").unwrap();
    assert_eq!(tagged.manual_tags(), ["vip".to_string()]);

    let again = hub.add_tag(&id, "vip").unwrap();
    assert_eq!(again.manual_tags(), ["vip".to_string()]);

    let untagged = hub.remove_tag(&id, "vip").unwrap();
    assert!(untagged.manual_tags().is_empty());
}

#[test]
fn events_by_external_id_and_session() {
    let hub = hub();
    let id = hub.add_customer(&customer("evt", "Evt")).unwrap().id.unwrap();

    hub.add_event(
        &Event::new("viewedPage", EventContext::Web)
            .for_external_id("evt")
            .with_properties(serde_json::json!({ "url": "https://example.com" })),
    )
    .unwrap();

    let session = hub.create_session_id();
    hub.add_customer_session(&id, &session).unwrap();
    hub.add_event(&Event::new("addedProduct", EventContext::Ecommerce).for_session(&session))
        .unwrap();

    hub.add_event(&Event::new("openedTicket", EventContext::Web).for_customer(&id))
        .unwrap();

    let events = hub.get_events(&id, &EventFilters::default()).unwrap();
    assert_eq!(events.total_elements(), 3);
    assert!(events
        .current_elements()
        .iter()
        .all(|e| e.customer_id.as_deref() == Some(id.as_str())));

    let ecommerce = hub
        .get_events(&id, &EventFilters::default().with_context(EventContext::Ecommerce))
        .unwrap();
    assert_eq!(ecommerce.total_elements(), 1);
    let event_id = ecommerce.current_elements()[0].id.clone().unwrap();

    let event = hub.get_event(&event_id).unwrap();
    assert_eq!(event.event_type, "addedProduct");

    let paged = hub
        .get_events(&id, &EventFilters::default().with_size(2))
        .unwrap();
    assert_eq!(paged.total_pages(), 2);
    let last = paged.next_page().unwrap();
    assert_eq!(last.current_elements().len(), 1);
    assert!(matches!(last.next_page(), Err(HubError::NoNextPage { .. })));
}

#[test]
fn unidentified_event_fails_before_sending() {
    // Nothing listens here, so reaching the network would be a transport error.
    let hub = hub_with_token("http://127.0.0.1:9", TOKEN);
    let err = hub
        .add_event(&Event::new("viewedPage", EventContext::Web))
        .unwrap_err();
    assert!(matches!(err, HubError::Usage(_)), "got {err:?}");
    assert_eq!(err.category(), ErrorCategory::Usage);
}

#[test]
fn bad_token_is_401() {
    let hub = hub_with_token(&start_mock(), "wrong");
    match hub.get_all_customers().unwrap_err() {
        HubError::Server { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected 401, got {other:?}"),
    }
}

#[test]
fn connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let hub = hub_with_token(&format!("http://{addr}"), TOKEN);
    let err = hub.get_customer("anything").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Transport, "got {err:?}");
}
