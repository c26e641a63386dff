mod support;

use std::net::SocketAddr;

use pretty_assertions::assert_eq;

use attachlink_markers::{DisplayMode, Marker, MarkerStatus};
use attachlink_pipeline::{Artifact, NoteTone, Pipeline, ResolverConfig};
use support::ServiceStub;

fn config_for(addr: SocketAddr) -> ResolverConfig {
    let mut config = ResolverConfig::default();
    config.service.auth_base = format!("http://{addr}/auth");
    config.service.lookup_base = format!("http://{addr}/svc/lookup");
    config
}

fn marker(id: &str, reference_id: &str, session_id: &str) -> Marker {
    Marker {
        id: id.to_string(),
        reference_id: reference_id.to_string(),
        session_id: session_id.to_string(),
        auth_token: format!("T-{session_id}"),
        raw_argument: format!("A1:{reference_id}"),
        environment: "prod".to_string(),
        display_mode: DisplayMode::Link,
        status: MarkerStatus::New,
    }
}

#[tokio::test]
async fn one_session_authenticates_once_for_all_its_markers() {
    let stub = ServiceStub::new();
    let addr = stub.serve().await;
    let pipeline = Pipeline::new(&config_for(addr)).expect("pipeline");

    let mut markers = vec![
        marker("attach-1", "FA100", "S1"),
        marker("attach-2", "FA200", "S1"),
    ];
    let report = pipeline.run(&mut markers).await;

    assert_eq!(stub.token_calls.get(), 1);
    assert_eq!(stub.validate_calls.get(), 1);
    assert_eq!(stub.lookup_calls.get(), 2);
    assert_eq!(markers[0].status, MarkerStatus::Found);
    assert_eq!(markers[1].status, MarkerStatus::Found);
    assert_eq!(report.stats.groups, 1);
    assert_eq!(report.stats.found, 2);
    assert_eq!(
        report.markers[0].artifact,
        Some(Artifact::Link {
            href: "https://files.example/FA100".to_string(),
            label: "Document".to_string(),
        })
    );
}

#[tokio::test]
async fn failed_group_does_not_stop_the_next_one() {
    let stub = ServiceStub::rejecting("S1");
    let addr = stub.serve().await;
    let pipeline = Pipeline::new(&config_for(addr)).expect("pipeline");

    let mut markers = vec![
        marker("attach-1", "FA100", "S1"),
        marker("attach-2", "FA200", "S1"),
        marker("attach-3", "FA300", "S2"),
    ];
    let report = pipeline.run(&mut markers).await;

    assert_eq!(markers[0].status, MarkerStatus::Error);
    assert_eq!(markers[1].status, MarkerStatus::Error);
    assert_eq!(markers[2].status, MarkerStatus::Found);
    // No lookups for the failed group, one for the healthy one.
    assert_eq!(stub.lookup_calls.get(), 1);
    assert_eq!(report.stats.auth_failures, 1);
    assert_eq!(report.stats.errors, 2);
    assert_eq!(report.stats.found, 1);
    assert!(matches!(
        report.markers[0].artifact,
        Some(Artifact::Note {
            tone: NoteTone::Error,
            ..
        })
    ));
}

#[tokio::test]
async fn duplicate_arguments_share_one_lookup() {
    let stub = ServiceStub::new();
    let addr = stub.serve().await;
    let pipeline = Pipeline::new(&config_for(addr)).expect("pipeline");

    let mut markers = vec![
        marker("attach-1", "FA100", "S1"),
        marker("attach-2", "FA100", "S1"),
    ];
    let report = pipeline.run(&mut markers).await;

    assert_eq!(stub.lookup_calls.get(), 1);
    assert_eq!(report.stats.found, 2);
    assert_eq!(report.markers[0].artifact, report.markers[1].artifact);
    assert_eq!(pipeline.cache().len(), 1);
}

#[tokio::test]
async fn a_second_pass_issues_no_requests() {
    let stub = ServiceStub::new();
    let addr = stub.serve().await;
    let pipeline = Pipeline::new(&config_for(addr)).expect("pipeline");

    let mut markers = vec![
        marker("attach-1", "FA100", "S1"),
        marker("attach-2", "FA200", "S2"),
    ];
    pipeline.run(&mut markers).await;
    assert_eq!(stub.token_calls.get(), 2);
    assert_eq!(stub.lookup_calls.get(), 2);

    let second = pipeline.run(&mut markers).await;

    assert_eq!(stub.token_calls.get(), 2);
    assert_eq!(stub.lookup_calls.get(), 2);
    assert_eq!(second.stats.groups, 0);
    assert_eq!(second.stats.skipped, 2);
    assert_eq!(second.markers[0].artifact, None);
}

#[tokio::test]
async fn empty_service_answer_marks_not_found() {
    let stub = ServiceStub::new();
    let addr = stub.serve().await;
    let mut config = config_for(addr);
    config.service.lookup_base = format!("http://{addr}/svc/empty");
    let pipeline = Pipeline::new(&config).expect("pipeline");

    let mut markers = vec![marker("attach-1", "FA100", "S1")];
    let report = pipeline.run(&mut markers).await;

    assert_eq!(markers[0].status, MarkerStatus::NotFound);
    assert_eq!(
        report.markers[0].artifact,
        Some(Artifact::Note {
            text: "No document found".to_string(),
            tone: NoteTone::Muted,
        })
    );
    assert_eq!(report.stats.not_found, 1);
}

#[tokio::test]
async fn misconfigured_pipeline_is_rejected_up_front() {
    let config = ResolverConfig::default();
    assert!(Pipeline::new(&config).is_err());
}
