use std::time::Duration;

use campoll::camera::snapshot_client::SnapshotClient;
use campoll::camera_config::CameraConfig;
use campoll::common::file_utils;
use campoll::core::poll_loop::run_poll_loop;
use campoll::core::shutdown::ShutdownController;
use campoll::errors::FetchError;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

fn camera(name: &str, url: String, interval_seconds: u64) -> CameraConfig {
    CameraConfig {
        name: name.to_string(),
        url,
        interval_seconds,
    }
}

fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn snapshot_extension_follows_the_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/snap"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"png-bytes".to_vec(), "image/png"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let client = SnapshotClient::new(Duration::from_secs(5)).unwrap();
    let cam = camera("garden", format!("{}/snap", server.uri()), 1);

    let saved = client
        .fetch_and_save(&cam, dir.path(), TIMESTAMP_FORMAT)
        .await
        .unwrap();

    assert_eq!(saved.path.extension().and_then(|e| e.to_str()), Some("png"));
    assert_eq!(saved.bytes, 9);
    assert!(saved.path.starts_with(dir.path()));
    let name = saved.path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("garden_"), "unexpected filename {}", name);
    assert_eq!(std::fs::read(&saved.path).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn missing_content_type_defaults_to_jpg() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/snap"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-ish".to_vec()))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let client = SnapshotClient::new(Duration::from_secs(5)).unwrap();
    let cam = camera("garage", format!("{}/snap", server.uri()), 1);

    let saved = client
        .fetch_and_save(&cam, dir.path(), TIMESTAMP_FORMAT)
        .await
        .unwrap();
    assert_eq!(saved.path.extension().and_then(|e| e.to_str()), Some("jpg"));
}

#[tokio::test]
async fn server_errors_produce_no_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/snap"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let client = SnapshotClient::new(Duration::from_secs(5)).unwrap();
    let cam = camera("lobby", format!("{}/snap", server.uri()), 1);

    let result = client.fetch_and_save(&cam, dir.path(), TIMESTAMP_FORMAT).await;
    assert!(matches!(result, Err(FetchError::HttpStatus(status)) if status.as_u16() == 500));
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn slow_responses_are_classified_as_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/snap"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"late".to_vec(), "image/jpeg")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let client = SnapshotClient::new(Duration::from_millis(50)).unwrap();
    let cam = camera("slow", format!("{}/snap", server.uri()), 1);

    let result = client.fetch_and_save(&cam, dir.path(), TIMESTAMP_FORMAT).await;
    assert!(matches!(result, Err(FetchError::Timeout)));
    assert_eq!(file_count(dir.path()), 0);
}

#[test]
fn provisioning_is_idempotent() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("snapshots");
    let cams = vec![
        camera("front-door", "http://127.0.0.1:1/a.jpg".to_string(), 60),
        camera("pool", "http://127.0.0.1:1/b.jpg".to_string(), 30),
    ];

    file_utils::provision_camera_directories(&root, &cams).unwrap();
    file_utils::provision_camera_directories(&root, &cams).unwrap();

    assert!(root.join("front-door").is_dir());
    assert!(root.join("pool").is_dir());
}

#[tokio::test]
async fn poll_loop_keeps_cycling_after_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cam"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let client = SnapshotClient::new(Duration::from_secs(2)).unwrap();
    let cam = camera("flaky", format!("{}/cam", server.uri()), 1);
    let shutdown = ShutdownController::new();

    let handle = tokio::spawn(run_poll_loop(
        cam,
        client,
        dir.path().to_path_buf(),
        TIMESTAMP_FORMAT.to_string(),
        shutdown.clone(),
    ));

    // Long enough for the t=0 fetch plus at least one rescheduled cycle.
    tokio::time::sleep(Duration::from_millis(1600)).await;
    shutdown.request_shutdown();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop did not stop after shutdown")
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.len() >= 2,
        "expected the loop to keep polling after failures, got {} request(s)",
        requests.len()
    );
    assert_eq!(file_count(dir.path()), 0);
}

#[tokio::test]
async fn failing_camera_never_blocks_its_sibling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"frame".to_vec(), "image/jpeg"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let cams = vec![
        camera("good", format!("{}/good", server.uri()), 1),
        camera("bad", format!("{}/bad", server.uri()), 1),
    ];
    file_utils::provision_camera_directories(dir.path(), &cams).unwrap();

    let client = SnapshotClient::new(Duration::from_secs(2)).unwrap();
    let shutdown = ShutdownController::new();
    let handles: Vec<_> = cams
        .iter()
        .map(|cam| {
            tokio::spawn(run_poll_loop(
                cam.clone(),
                client.clone(),
                dir.path().join(&cam.name),
                TIMESTAMP_FORMAT.to_string(),
                shutdown.clone(),
            ))
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(1200)).await;
    shutdown.request_shutdown();
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("a loop did not stop after shutdown")
            .unwrap();
    }

    assert!(
        file_count(&dir.path().join("good")) >= 1,
        "healthy camera saved no snapshots"
    );
    assert_eq!(file_count(&dir.path().join("bad")), 0);
}

#[tokio::test]
async fn shutdown_interrupts_a_sleeping_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cam"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"frame".to_vec(), "image/jpeg"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let client = SnapshotClient::new(Duration::from_secs(2)).unwrap();
    // One-hour interval: the loop would sleep far past the test without an
    // interruptible wait.
    let cam = camera("patient", format!("{}/cam", server.uri()), 3600);
    let shutdown = ShutdownController::new();

    let handle = tokio::spawn(run_poll_loop(
        cam,
        client,
        dir.path().to_path_buf(),
        TIMESTAMP_FORMAT.to_string(),
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.request_shutdown();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop slept through the shutdown signal")
        .unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(file_count(dir.path()), 1);
}

#[tokio::test]
async fn preset_shutdown_prevents_any_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cam"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"frame".to_vec(), "image/jpeg"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let client = SnapshotClient::new(Duration::from_secs(2)).unwrap();
    let cam = camera("stopped", format!("{}/cam", server.uri()), 1);
    let shutdown = ShutdownController::new();
    shutdown.request_shutdown();

    tokio::time::timeout(
        Duration::from_secs(1),
        run_poll_loop(
            cam,
            client,
            dir.path().to_path_buf(),
            TIMESTAMP_FORMAT.to_string(),
            shutdown,
        ),
    )
    .await
    .expect("loop with a pre-set shutdown flag should return immediately");

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(file_count(dir.path()), 0);
}
