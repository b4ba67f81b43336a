//! Runs the page router over real HTTP with the in-memory backend behind it.

mod common;

use chat_ui_lib::web::{self, state::AppState};
use common::{app_state, eventually, FakeBackend};
use reqwest::{multipart, StatusCode};
use std::sync::Arc;
use std::time::Duration;

async fn serve(state: Arc<AppState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = web::router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn upload_form(names: &[&str]) -> multipart::Form {
    names.iter().fold(multipart::Form::new(), |form, name| {
        form.part(
            "files",
            multipart::Part::bytes(b"text".to_vec()).file_name(name.to_string()),
        )
    })
}

/// The drain id in the collector an upload response carries.
fn drain_id(html: &str) -> Option<String> {
    let start = html.find("/ui/uploads/drain/")? + "/ui/uploads/drain/".len();
    html.get(start..start + 36).map(str::to_string)
}

#[tokio::test]
async fn index_and_health() {
    let base = serve(app_state(FakeBackend::new())).await;
    let client = reqwest::Client::new();

    let page = client.get(&base).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("Welcome to the RAG Experimentation System!"));
    assert!(page.contains(r#"id="chat-messages""#));

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn message_then_reply_round_trip() {
    let backend = FakeBackend::new();
    backend.set_latency(Duration::from_millis(200));
    let state = app_state(backend);
    let base = serve(state.clone()).await;
    let client = reqwest::Client::new();

    let html = client
        .post(format!("{}/ui/messages", base))
        .form(&[("message", "hello <there>")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("hello &lt;there&gt;"));
    assert!(html.contains("Assistant is thinking..."));

    let pending_id = state.session.lock().await.pending_send_id().unwrap();

    let second = client
        .post(format!("{}/ui/messages", base))
        .form(&[("message", "too soon")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(second.is_empty());

    let reply = client
        .post(format!("{}/ui/messages/{}/reply", base, pending_id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(reply.contains("Answer to: hello &lt;there&gt;"));
    assert!(reply.contains(&format!(r#"id="typing-{}" hx-swap-oob="delete""#, pending_id)));
    assert!(reply.contains(r#"id="status-panel" class="status-panel" hx-swap-oob="true""#));
}

#[tokio::test]
async fn upload_then_drain() {
    let backend = FakeBackend::new();
    let base = serve(app_state(backend.clone())).await;
    let client = reqwest::Client::new();

    let queued = client
        .post(format!("{}/ui/uploads", base))
        .multipart(upload_form(&["a.txt", "b.txt"]))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(queued.matches("Uploading \"").count(), 2);
    let drain = drain_id(&queued).expect("upload starts a drain");

    let drained = client
        .post(format!("{}/ui/uploads/drain/{}", base, drain))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(drained.contains("✅ Uploaded &quot;a.txt&quot; (4 tokens)"));
    assert!(drained.contains("✅ Uploaded &quot;b.txt&quot; (4 tokens)"));
    assert!(drained.contains(r#"id="documents-panel""#));
    assert!(drained.contains(&format!(r#"id="upload-drain-{}" hx-swap-oob="delete""#, drain)));
    assert_eq!(
        backend.calls(),
        vec!["upload:a.txt", "upload:b.txt", "documents", "status"]
    );
}

#[tokio::test]
async fn uploads_run_even_when_the_drain_is_never_collected() {
    let backend = FakeBackend::new();
    let state = app_state(backend.clone());
    let base = serve(state.clone()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/ui/uploads", base))
        .multipart(upload_form(&["a.txt"]))
        .send()
        .await
        .unwrap();
    assert!(eventually(|| backend.calls().contains(&"status".to_string())).await);

    let page = client.get(&base).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("✅ Uploaded &quot;a.txt&quot; (4 tokens)"));
    assert!(!page.contains("/ui/uploads/drain/"));

    let second = client
        .post(format!("{}/ui/uploads", base))
        .multipart(upload_form(&["b.txt"]))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(drain_id(&second).is_some());
    assert!(eventually(|| backend.calls().contains(&"upload:b.txt".to_string())).await);
}

#[tokio::test]
async fn duplicate_drain_requests_never_upload_in_parallel() {
    let backend = FakeBackend::new();
    backend.set_latency(Duration::from_millis(50));
    let base = serve(app_state(backend.clone())).await;
    let client = reqwest::Client::new();

    let queued = client
        .post(format!("{}/ui/uploads", base))
        .multipart(upload_form(&["a.txt", "b.txt", "c.txt", "d.txt"]))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let drain_url = format!("{}/ui/uploads/drain/{}", base, drain_id(&queued).unwrap());

    let (first, second) = tokio::join!(
        client.post(&drain_url).send(),
        client.post(&drain_url).send()
    );
    let first = first.unwrap().text().await.unwrap();
    let second = second.unwrap().text().await.unwrap();

    assert_eq!(backend.max_uploads_in_flight(), 1);
    let reported = first.matches("✅ Uploaded").count() + second.matches("✅ Uploaded").count();
    assert_eq!(reported, 4);
}

#[tokio::test]
async fn reload_while_reply_pending_keeps_the_chat_usable() {
    let backend = FakeBackend::new();
    backend.set_latency(Duration::from_millis(200));
    let state = app_state(backend.clone());
    let base = serve(state.clone()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/ui/messages", base))
        .form(&[("message", "hi")])
        .send()
        .await
        .unwrap();
    let pending_id = state.session.lock().await.pending_send_id().unwrap();

    let page = client.get(&base).send().await.unwrap().text().await.unwrap();
    assert!(page.contains(&format!(r#"id="typing-{}""#, pending_id)));

    let reply = client
        .post(format!("{}/ui/messages/{}/reply", base, pending_id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(reply.contains("Answer to: hi"));
    assert!(reply.contains(r#"class="btn btn-primary" hx-swap-oob="true">Send"#));
}

#[tokio::test]
async fn abandoned_reply_still_lands_and_unblocks_sending() {
    let backend = FakeBackend::new();
    let state = app_state(backend.clone());
    let base = serve(state.clone()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/ui/messages", base))
        .form(&[("message", "hi")])
        .send()
        .await
        .unwrap();
    assert!(eventually(|| backend.calls().contains(&"chat".to_string())).await);
    let mut settled = false;
    for _ in 0..100 {
        if !state.session.lock().await.is_sending() {
            settled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(settled);

    let page = client.get(&base).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("Answer to: hi"));
    assert!(!page.contains("/reply"));

    let next = client
        .post(format!("{}/ui/messages", base))
        .form(&[("message", "again")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(next.contains("again"));
}

#[tokio::test]
async fn copy_without_clipboard_falls_back_to_selection() {
    let state = app_state(FakeBackend::new());
    let base = serve(state.clone()).await;
    let client = reqwest::Client::new();
    let welcome_id = state.session.lock().await.messages()[0].id;

    let html = client
        .post(format!("{}/ui/messages/{}/copy", base, welcome_id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("copy-fallback"));
    assert!(html.contains("Welcome to the RAG Experimentation System!"));
}

#[tokio::test]
async fn unknown_targets_are_not_found() {
    let base = serve(app_state(FakeBackend::new())).await;
    let client = reqwest::Client::new();

    let modal = client
        .delete(format!("{}/ui/modals/settings", base))
        .send()
        .await
        .unwrap();
    assert_eq!(modal.status(), StatusCode::NOT_FOUND);

    let chunk = client
        .get(format!(
            "{}/ui/messages/{}/chunks/0",
            base,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(chunk.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn escape_closes_mode_switch_before_preview() {
    let state = app_state(FakeBackend::new());
    {
        let mut session = state.session.lock().await;
        session.modals_mut().open_preview("doc-1");
        session.modals_mut().open_mode_switch(12_000);
    }
    let base = serve(state.clone()).await;
    let client = reqwest::Client::new();

    let html = client
        .post(format!("{}/ui/modals/escape", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains(r#"<div id="mode-switch-modal" class="modal-overlay" hx-swap-oob="true"></div>"#));
    assert!(html.contains("document-preview-modal\" class=\"modal-overlay show"));
}
