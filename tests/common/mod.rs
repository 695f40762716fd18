use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Secret shared between the spawned server and tokens forged in-process
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/trackdesk-api");
        cmd.env("TRACKDESK_PORT", port.to_string())
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL when one is
        // configured; without one it comes up degraded, which is enough for
        // the database-independent tests here
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

#[allow(dead_code)]
fn sample_user() -> trackdesk_api::database::models::User {
    trackdesk_api::database::models::User {
        id: uuid::Uuid::new_v4(),
        username: "test-user".to_string(),
        age: 30,
        email: "test-user@example.com".to_string(),
        password_hash: String::new(),
        can_be_contacted: true,
        can_data_be_shared: false,
        date_joined: chrono::Utc::now(),
    }
}

/// Mint a valid access token for a user that does not exist in any store.
/// Enough to get past the auth middleware in database-independent tests.
#[allow(dead_code)]
pub fn forge_access_token() -> (uuid::Uuid, String) {
    std::env::set_var("JWT_SECRET", TEST_JWT_SECRET);
    let user = sample_user();
    let pair = trackdesk_api::auth::generate_token_pair(&user).expect("token pair");
    (user.id, pair.token)
}

/// Mint a refresh token, which protected routes must refuse
#[allow(dead_code)]
pub fn forge_refresh_token() -> String {
    std::env::set_var("JWT_SECRET", TEST_JWT_SECRET);
    let user = sample_user();
    trackdesk_api::auth::generate_token_pair(&user).expect("token pair").refresh
}
