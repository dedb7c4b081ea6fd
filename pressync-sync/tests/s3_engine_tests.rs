//! SyncEngine over the real S3 client, with wiremock standing in for S3.

mod support;

use pressync_sync::{DeleteOutcome, FailureKind, SyncConfig, SyncEngine, SyncError};
use pretty_assertions::assert_eq;
use support::{INDEX_HTML, SITE_BUCKET, STYLE_CSS, full_config};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> SyncEngine {
    let mut config = full_config().with_endpoint(server.uri());
    config.client.max_attempts = 1;
    SyncEngine::new(config)
}

async fn mount_site_bucket(server: &MockServer) {
    Mock::given(method("HEAD"))
        .and(path_regex(format!("^/{SITE_BUCKET}/?$")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

async fn received(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let path = r.url.path();
            let path = path.strip_suffix('/').unwrap_or(path);
            (r.method.to_string(), path.to_string())
        })
        .collect()
}

#[tokio::test]
async fn publish_then_remove_over_s3() {
    support::init_tracing();
    let server = MockServer::start().await;
    mount_site_bucket(&server).await;
    Mock::given(method("PUT"))
        .and(path(format!("/{SITE_BUCKET}/blog/index.html")))
        .and(header("content-type", "text/html"))
        .and(header("x-amz-acl", "public-read"))
        .and(header("x-amz-storage-class", "STANDARD"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"0123456789abcdef0123456789abcdef\""),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path(format!("/{SITE_BUCKET}/blog/index.html")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/{SITE_BUCKET}/blog/index.html")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let page = support::write_file(dir.path(), "blog/index.html", INDEX_HTML);
    let mut engine = setup(&server);
    assert!(!engine.is_connected());

    let published = engine
        .on_file_written(&page, "https://example.com/blog/index.html")
        .await
        .unwrap();
    assert_eq!(published.object.bucket, SITE_BUCKET);
    assert_eq!(published.object.key, "blog/index.html");
    assert_eq!(
        published.metadata.etag.as_deref(),
        Some("\"0123456789abcdef0123456789abcdef\"")
    );
    assert!(engine.is_connected());

    let removed = engine.on_file_removed("/blog/index.html").await.unwrap();
    assert!(matches!(removed, DeleteOutcome::Deleted(_)));

    let bucket_path = format!("/{SITE_BUCKET}");
    let object_path = format!("/{SITE_BUCKET}/blog/index.html");
    assert_eq!(
        received(&server).await,
        vec![
            ("HEAD".to_string(), bucket_path),
            ("PUT".to_string(), object_path.clone()),
            ("HEAD".to_string(), object_path.clone()),
            ("DELETE".to_string(), object_path),
        ]
    );
}

#[tokio::test]
async fn configured_acl_and_class_reach_the_put() {
    let server = MockServer::start().await;
    mount_site_bucket(&server).await;
    Mock::given(method("PUT"))
        .and(path(format!("/{SITE_BUCKET}/style.css")))
        .and(header("content-type", "text/css"))
        .and(header("x-amz-acl", "private"))
        .and(header("x-amz-storage-class", "REDUCED_REDUNDANCY"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = SyncConfig {
        default_acl: "private".parse().unwrap(),
        storage_class: "reduced_redundancy".parse().unwrap(),
        ..full_config().with_endpoint(server.uri())
    };
    let mut engine = SyncEngine::new(config);
    let dir = tempfile::tempdir().unwrap();
    let css = support::write_file(dir.path(), "style.css", STYLE_CSS);

    engine.on_file_written(&css, "/style.css").await.unwrap();
}

#[tokio::test]
async fn removing_absent_object_sends_no_delete() {
    let server = MockServer::start().await;
    mount_site_bucket(&server).await;
    Mock::given(method("HEAD"))
        .and(path(format!("/{SITE_BUCKET}/gone.html")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let mut engine = setup(&server);
    let outcome = engine.on_file_removed("/gone.html").await.unwrap();

    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
}

#[tokio::test]
async fn missing_bucket_aborts_before_put() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path_regex(format!("^/{SITE_BUCKET}/?$")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut engine = setup(&server);
    let dir = tempfile::tempdir().unwrap();
    let page = support::write_file(dir.path(), "index.html", INDEX_HTML);

    let err = engine.on_file_written(&page, "/index.html").await.unwrap_err();

    assert!(matches!(&err, SyncError::BucketUnavailable(b) if b == SITE_BUCKET), "{err:?}");
    assert_eq!(err.kind(), FailureKind::NotFound);
    assert_eq!(engine.current_bucket(), None);
}
