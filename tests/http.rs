use axum::{http::StatusCode, routing::get, Json, Router};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct RangeBody {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct RangeResponse {
    period: String,
    range: RangeBody,
    day_count: usize,
}

#[derive(Debug, Deserialize)]
struct SeriesBody {
    labels: Vec<String>,
    values: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct SeriesOutcome {
    period: String,
    series: SeriesBody,
    degraded: bool,
}

#[derive(Debug, Deserialize)]
struct UiStateBody {
    theme: String,
    sidebar_open: bool,
    open_modal: Option<String>,
    scroll_locked: bool,
}

#[derive(Debug, Deserialize)]
struct NotificationBody {
    id: u64,
    level: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct NotifyResponse {
    id: u64,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Fake clients API running on its own thread so it outlives each test's runtime.
struct Upstream {
    url: String,
    healthy: Arc<AtomicBool>,
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static UPSTREAM: Lazy<Upstream> = Lazy::new(start_upstream);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn start_upstream() -> Upstream {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream port");
    listener.set_nonblocking(true).expect("nonblocking upstream");
    let port = listener.local_addr().unwrap().port();
    let healthy = Arc::new(AtomicBool::new(true));

    let flag = Arc::clone(&healthy);
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("upstream runtime");
        runtime.block_on(async move {
            let app = Router::new().route(
                "/api-clients.php",
                get(move || {
                    let flag = Arc::clone(&flag);
                    async move {
                        if !flag.load(Ordering::SeqCst) {
                            return Err(StatusCode::SERVICE_UNAVAILABLE);
                        }
                        Ok(Json(json!({
                            "clients": [
                                { "id": 1, "created_at": "2024-02-01 08:00:00" },
                                { "id": 2, "created_at": "2024-02-15 10:00:00" },
                                { "id": 3, "created_at": "2024-02-15T12:30:00" },
                                { "id": 4, "created_at": null },
                                { "id": 5, "created_at": "2024-03-01 00:00:00" }
                            ]
                        })))
                    }
                }),
            );
            let listener = tokio::net::TcpListener::from_std(listener).expect("upstream listener");
            axum::serve(listener, app).await.expect("upstream server");
        });
    });

    Upstream {
        url: format!("http://127.0.0.1:{port}/api-clients.php"),
        healthy,
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("dashboard_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/periods")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_dashboard_periods"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("CLIENTS_API_URL", &UPSTREAM.url)
        .env("TOAST_TTL_SECS", "60")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json<T: for<'de> Deserialize<'de>>(client: &Client, url: String) -> T {
    let response = client.get(url).send().await.unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn post_ui(client: &Client, server: &TestServer, action: serde_json::Value) -> UiStateBody {
    let response = client
        .post(format!("{}/api/ui", server.base_url))
        .json(&action)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_series_counts_upstream_clients() {
    let _guard = TEST_LOCK.lock().await;
    UPSTREAM.healthy.store(true, Ordering::SeqCst);
    let server = shared_server().await;
    let client = Client::new();

    let outcome: SeriesOutcome = get_json(
        &client,
        format!("{}/api/series?period=this-month&at=2024-02-15", server.base_url),
    )
    .await;

    assert_eq!(outcome.period, "this-month");
    assert!(!outcome.degraded);
    assert_eq!(outcome.series.values.len(), 29);
    assert_eq!(outcome.series.labels.first().map(String::as_str), Some("01"));
    assert_eq!(outcome.series.labels.last().map(String::as_str), Some("29"));
    assert_eq!(outcome.series.values[0], 1);
    assert_eq!(outcome.series.values[14], 2);
    assert_eq!(outcome.series.values.iter().sum::<u64>(), 3);
}

#[tokio::test]
async fn http_series_degrades_when_upstream_fails() {
    let _guard = TEST_LOCK.lock().await;
    UPSTREAM.healthy.store(false, Ordering::SeqCst);
    let server = shared_server().await;
    let client = Client::new();

    let outcome: SeriesOutcome = get_json(
        &client,
        format!("{}/api/series?period=7&at=2024-02-15", server.base_url),
    )
    .await;
    UPSTREAM.healthy.store(true, Ordering::SeqCst);

    assert!(outcome.degraded);
    assert_eq!(outcome.series.values, vec![0; 7]);
    assert_eq!(
        outcome.series.labels,
        vec!["09", "10", "11", "12", "13", "14", "15"]
    );

    let toasts: Vec<NotificationBody> =
        get_json(&client, format!("{}/api/notifications", server.base_url)).await;
    assert!(toasts.iter().any(|toast| toast.level == "warning"));
}

#[tokio::test]
async fn http_range_handles_quarter_wrap_and_unknown_tokens() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let range: RangeResponse = get_json(
        &client,
        format!("{}/api/range?period=last-quarter&at=2024-01-10", server.base_url),
    )
    .await;
    assert_eq!(range.period, "last-quarter");
    assert_eq!(range.range.start, "2023-10-01T00:00:00");
    assert_eq!(range.range.end, "2023-12-31T23:59:59");
    assert_eq!(range.day_count, 92);

    let range: RangeResponse = get_json(
        &client,
        format!("{}/api/range?period=fortnight&at=2024-02-15", server.base_url),
    )
    .await;
    assert_eq!(range.period, "this-month");
    assert_eq!(range.range.end, "2024-02-29T23:59:59");

    let response = client
        .get(format!("{}/api/range?period=7&at=15/02/2024", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_ui_actions_update_and_persist_preferences() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before: UiStateBody = get_json(&client, format!("{}/api/ui", server.base_url)).await;
    let after = post_ui(&client, &server, json!({ "type": "toggle_theme" })).await;
    assert_ne!(after.theme, before.theme);

    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&server.data_path).unwrap()).unwrap();
    assert_eq!(stored["theme"], after.theme.as_str());

    if !after.sidebar_open {
        let opened = post_ui(&client, &server, json!({ "type": "toggle_sidebar" })).await;
        assert!(opened.sidebar_open);
    }
    let modal = post_ui(
        &client,
        &server,
        json!({ "type": "open_modal", "id": "series-details", "viewport_width": 375 }),
    )
    .await;
    assert_eq!(modal.open_modal.as_deref(), Some("series-details"));
    assert!(modal.scroll_locked);
    assert!(!modal.sidebar_open);

    let closed = post_ui(&client, &server, json!({ "type": "close_modal" })).await;
    assert_eq!(closed.open_modal, None);
    assert!(!closed.scroll_locked);

    post_ui(&client, &server, json!({ "type": "set_theme", "theme": before.theme })).await;
}

#[tokio::test]
async fn http_notification_lifecycle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/notifications", server.base_url))
        .json(&json!({ "level": "success", "message": "Saved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let created: NotifyResponse = response.json().await.unwrap();

    let toasts: Vec<NotificationBody> =
        get_json(&client, format!("{}/api/notifications", server.base_url)).await;
    let toast = toasts
        .iter()
        .find(|toast| toast.id == created.id)
        .expect("missing toast");
    assert_eq!(toast.message, "Saved");
    assert_eq!(toast.level, "success");

    let url = format!("{}/api/notifications/{}", server.base_url, created.id);
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/api/notifications", server.base_url))
        .json(&json!({ "message": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_index_renders_period_selector() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"<select id="period">"#));
    assert!(html.contains(r#"value="last-quarter""#));
}
