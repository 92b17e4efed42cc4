//! End-to-end tests for the async facade over reqwest.

use std::time::Duration;

use hub_core::{
    AsyncContactHub, Auth, BaseProperties, Customer, ErrorCategory, Event, EventContext,
    EventFilters, GetCustomersOptions, HubClient, HubConfig, HubError, ReqwestTransport,
};

const TOKEN: &str = "async-token";

async fn start_mock() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener, TOKEN).await });
    format!("http://{addr}")
}

fn hub(base_url: &str) -> AsyncContactHub<ReqwestTransport> {
    AsyncContactHub::new(
        HubClient::new(base_url, Auth::new(TOKEN, "ws-async", "node-async")),
        ReqwestTransport::new(Duration::from_secs(5)).unwrap(),
    )
}

fn customer(external_id: &str) -> Customer {
    Customer {
        external_id: Some(external_id.to_string()),
        base: Some(BaseProperties {
            first_name: Some("Async".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn customer_round_trip() {
    let hub = hub(&start_mock().await);

    let created = hub.add_customer(&customer("a-1")).await.unwrap();
    let id = created.id.clone().unwrap();

    let fetched = hub.get_customer(&id).await.unwrap();
    assert_eq!(fetched.external_id.as_deref(), Some("a-1"));
    assert_eq!(fetched.node_id.as_deref(), Some("node-async"));

    let tagged = hub.add_tag(&id, "early").await.unwrap();
    assert_eq!(tagged.manual_tags(), ["early".to_string()]);

    hub.delete_customer(&id).await.unwrap();
    let err = hub.get_customer(&id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread")]
async fn pages_are_fetched_lazily() {
    let hub = hub(&start_mock().await);
    for i in 0..7 {
        hub.add_customer(&customer(&format!("a{i}"))).await.unwrap();
    }

    let first = hub
        .get_customers(&GetCustomersOptions::default().with_size(3))
        .await
        .unwrap();
    assert_eq!(first.total_pages(), 3);
    assert!(first.has_next_page());

    let second = first.next_page().await.unwrap();
    assert_eq!(second.current_page_number(), 1);
    let third = second.next_page().await.unwrap();
    assert_eq!(third.current_page_number(), 2);
    assert_eq!(third.current_elements().len(), 1);
    assert!(!third.has_next_page());

    let err = third.next_page().await.unwrap_err();
    assert!(matches!(err, HubError::NoNextPage { .. }));
    assert_eq!(err.category(), ErrorCategory::Usage);

    let all = first.collect_all().await.unwrap();
    assert_eq!(all.len(), 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn external_id_event_reaches_the_customer() {
    let hub = hub(&start_mock().await);
    let id = hub.add_customer(&customer("ev-a")).await.unwrap().id.unwrap();

    hub.add_event(&Event::new("viewedPage", EventContext::Web).for_external_id("ev-a"))
        .await
        .unwrap();

    let events = hub.get_events(&id, &EventFilters::default()).await.unwrap();
    assert_eq!(events.total_elements(), 1);
    let event = &events.current_elements()[0];
    assert_eq!(event.customer_id.as_deref(), Some(id.as_str()));
    assert!(event.bring_back_properties.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn unidentified_event_fails_locally() {
    let hub = hub("http://127.0.0.1:9");
    let err = hub
        .add_event(&Event::new("viewedPage", EventContext::Web))
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Usage(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn from_config_points_at_base_url() {
    let base = start_mock().await;
    let config = HubConfig::new(Auth::new(TOKEN, "ws-cfg", "node-cfg"))
        .with_base_url(&base)
        .with_timeout(Duration::from_secs(2));
    let hub = AsyncContactHub::from_config(&config).unwrap();

    let page = hub.get_all_customers().await.unwrap();
    assert_eq!(page.total_elements(), 0);
}
