// Boots a real guest directory server per test on an ephemeral port, backed
// by the local file store in its own scratch directory.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use guest_directory::{BackendKind, Settings};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "s3cret";

pub struct TestServer {
    pub base_url: String,
    pub data_dir: PathBuf,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn stored_file(&self) -> PathBuf {
        self.data_dir.join("wedding_guests.json")
    }
}

// Fresh scratch directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("guest-directory-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

pub fn start_server() -> TestServer {
    start_server_in(&scratch_dir())
}

// Start a server over `data_dir`. Several servers may share one directory to
// check what survives a restart.
pub fn start_server_in(data_dir: &Path) -> TestServer {
    let settings = Settings {
        backend: BackendKind::Local,
        data_dir: data_dir.to_path_buf(),
        admin_email: ADMIN_EMAIL.to_string(),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        ..Settings::default()
    };

    let published_url = Arc::new(OnceLock::<String>::new());
    let published_url_thread = Arc::clone(&published_url);
    // Own OS thread and runtime so the server outlives the test's runtime.
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("test runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral test port");
            let addr = listener.local_addr().expect("get local addr");
            let _ = published_url_thread.set(format!("http://{}", addr));
            guest_directory::run(listener, settings)
                .await
                .expect("server failed");
        });
    });

    let base_url = wait_for_server_url_and_readiness(published_url);
    TestServer {
        base_url,
        data_dir: data_dir.to_path_buf(),
    }
}

// Sign in as the configured admin and return the bearer token.
pub async fn login(client: &reqwest::Client, server: &TestServer) -> String {
    let response = client
        .post(server.url("/admin/login"))
        .json(&serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .expect("login request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("login body");
    body["token"].as_str().expect("token in login body").to_string()
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) -> String {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://")
        .to_string();

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return base_url;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}
