//! Register, deliver, rotate and reject, end to end over a disk store.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use flux_credentials::{CredentialManager, RecipientId};
use flux_relay::CommandService;
use flux_relay::ingress::{self, IngressState};
use flux_relay::metrics::RelayMetrics;
use flux_store::DiskStore;
use flux_telegram::{ChatTransport, Command};
use parking_lot::Mutex;
use tower::ServiceExt;
use url::Url;

#[derive(Debug, Default)]
struct Recorder {
    sent: Mutex<Vec<(i64, String)>>,
}

impl Recorder {
    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().clone()
    }
}

impl ChatTransport for Recorder {
    fn send_message<'a>(
        &'a self,
        chat_id: i64,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = flux_telegram::Result<()>> + Send + 'a>> {
        self.sent.lock().push((chat_id, text.to_string()));
        Box::pin(async { Ok(()) })
    }
}

/// Pulls the link target out of a `[label](target)` reply.
fn link_target(reply: &str) -> Url {
    let start = reply.rfind("](").unwrap() + 2;
    let end = reply.len() - 1;
    assert!(reply.ends_with(')'));
    Url::parse(&reply[start..end]).unwrap()
}

async fn post(app: &Router, path: &str, body: &'static str) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

const EVENT: &str = r#"{
    "severity": "error",
    "reportingInstance": "helm-controller-5c6f",
    "reportingController": "helm-controller",
    "reason": "UpgradeFailed",
    "involvedObject": {"kind": "HelmRelease", "namespace": "apps", "name": "podinfo"},
    "message": "Helm upgrade failed: timed out waiting for the condition"
}"#;

#[tokio::test]
async fn register_deliver_rotate_reject() {
    let dir = tempfile::tempdir().unwrap();
    let open = || DiskStore::open(dir.path().join("db"), dir.path().join("db/tmp")).unwrap();
    let credentials = CredentialManager::new(Arc::new(open()));
    let metrics = Arc::new(RelayMetrics::new());

    let replies = Arc::new(Recorder::default());
    let events = Arc::new(Recorder::default());

    let commands = CommandService::new(
        credentials.clone(),
        replies.clone(),
        Url::parse("https://bot.example.com").unwrap(),
        metrics.clone(),
    );
    let app = ingress::router(IngressState::new(
        credentials.clone(),
        events.clone(),
        metrics.clone(),
    ));

    // Recipient 42 registers and receives S1.
    commands.execute(Command::Start, 42).await;
    let first = link_target(&replies.sent()[0].1);
    assert!(first.path().starts_with("/api/v1/webhook/42/"));

    // An event posted with S1 is forwarded.
    assert_eq!(post(&app, first.path(), EVENT).await, StatusCode::OK);
    let delivered = events.sent();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, 42);
    assert!(delivered[0].1.starts_with("Severity: *error*\nInstance: *helm\\-controller\\-5c6f*"));

    // A wrong secret is refused without sending anything.
    assert_eq!(post(&app, "/api/v1/webhook/42/wrong", EVENT).await, StatusCode::FORBIDDEN);
    assert_eq!(events.sent().len(), 1);

    // Rotation yields S2 and retires S1.
    commands.execute(Command::Rotate, 42).await;
    let second = link_target(&replies.sent()[1].1);
    assert_ne!(first, second);

    assert_eq!(post(&app, first.path(), EVENT).await, StatusCode::FORBIDDEN);
    assert_eq!(post(&app, second.path(), EVENT).await, StatusCode::OK);
    assert_eq!(events.sent().len(), 2);

    // A non-JSON body on an authorized URL is refused.
    assert_eq!(post(&app, second.path(), "<html/>").await, StatusCode::BAD_REQUEST);
    assert_eq!(events.sent().len(), 2);

    let exposed = metrics.encode();
    for line in [
        r#"fluxcdbot_webhook_requests_total{outcome="forwarded"} 2"#,
        r#"fluxcdbot_webhook_requests_total{outcome="unauthorized"} 2"#,
        r#"fluxcdbot_webhook_requests_total{outcome="malformed_payload"} 1"#,
        r#"fluxcdbot_commands_total{command="start",outcome="issued"} 1"#,
        r#"fluxcdbot_commands_total{command="rotate",outcome="rotated"} 1"#,
    ] {
        assert!(exposed.contains(line), "missing {line} in:\n{exposed}");
    }

    // The rotated secret survives a restart.
    let reopened = CredentialManager::new(Arc::new(open()));
    let secret = second.path().rsplit('/').next().unwrap();
    assert!(reopened.verify(RecipientId::from_chat_id(42), secret));
}

#[tokio::test]
async fn restart_with_existing_registration_stays_silent() {
    let dir = tempfile::tempdir().unwrap();
    let open = || Arc::new(DiskStore::open(dir.path().join("db"), dir.path().join("tmp")).unwrap());
    let replies = Arc::new(Recorder::default());
    let base = Url::parse("http://127.0.0.1:8080").unwrap();

    let before = CommandService::new(
        CredentialManager::new(open()),
        replies.clone(),
        base.clone(),
        Arc::new(RelayMetrics::new()),
    );
    before.execute(Command::Start, -1001).await;

    let after = CommandService::new(
        CredentialManager::new(open()),
        replies.clone(),
        base,
        Arc::new(RelayMetrics::new()),
    );
    after.execute(Command::Start, -1001).await;

    assert_eq!(replies.sent().len(), 1);
}
