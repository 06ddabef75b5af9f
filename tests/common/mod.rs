//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a full [`AppContext`] over an
//! in-memory catalog and a temp-dir media root. The [`with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.
#![allow(dead_code)] // each test binary uses a subset of the harness

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use vidbox_core::config::Config;
use vidbox_core::token::{HourBucket, StreamTokens};
use vidbox_core::{MediaId, MediaRecord, MemoryCatalog};
use vidbox_server::context::AppContext;
use vidbox_server::router::build_router;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory catalog rooted in a temp directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub catalog: Arc<MemoryCatalog>,
    pub media_dir: TempDir,
}

impl TestHarness {
    /// Create a harness with default test configuration.
    pub fn new() -> Self {
        let media_dir = tempfile::tempdir().expect("failed to create media dir");
        let mut config = Config::default();
        config.stream.secret = TEST_SECRET.into();
        config.media.roots = vec![media_dir.path().to_path_buf()];
        // Small chunks so multi-chunk paths are exercised by small files.
        config.stream.chunk_size = 64 * 1024;
        Self::with_config(config, media_dir)
    }

    /// Create a harness with a custom configuration rooted at `media_dir`.
    pub fn with_config(config: Config, media_dir: TempDir) -> Self {
        let catalog = Arc::new(MemoryCatalog::new());
        let ctx = AppContext::new(config, catalog.clone());
        Self {
            ctx,
            catalog,
            media_dir,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let addr = harness.spawn_server().await;
        (harness, addr)
    }

    /// Spawn the router for this harness on a random port.
    pub async fn spawn_server(&self) -> SocketAddr {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }

    /// Write `data` to `name` under the media root and catalog it as `id`.
    pub fn add_media(&self, id: i64, name: &str, data: &[u8]) -> PathBuf {
        let path = self.media_dir.path().join(name);
        std::fs::write(&path, data).expect("failed to write media file");
        self.catalog
            .insert(MediaRecord::from_path(MediaId::from(id), &path));
        path
    }

    /// Catalog `id` pointing at an arbitrary path (possibly outside roots).
    pub fn add_record_at(&self, id: i64, path: &std::path::Path) {
        self.catalog
            .insert(MediaRecord::from_path(MediaId::from(id), path));
    }

    /// Mint a currently-valid token for `id`.
    pub fn token_for(&self, id: i64) -> String {
        StreamTokens::new(TEST_SECRET).generate(MediaId::from(id), HourBucket::now())
    }
}

/// Write an executable stub encoder into `dir` that prints `output` and
/// exits. Wired into `transcode.ffmpeg_path` it lets transcode-path tests
/// run without a real ffmpeg.
#[cfg(unix)]
pub fn write_stub_encoder(dir: &std::path::Path, output: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("stub-encoder.sh");
    let script = format!("#!/bin/sh\nprintf '%s' '{output}'\n");
    std::fs::write(&path, script).expect("failed to write stub encoder");
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Write an executable stub encoder that records its PID in `pid_file`,
/// emits one chunk, and then hangs. Lets tests observe whether the server
/// tears the encoder down when the client goes away.
pub fn write_hanging_encoder(dir: &std::path::Path, pid_file: &std::path::Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("hanging-encoder.sh");
    let script = format!(
        "#!/bin/sh\necho $$ > '{}'\nprintf '%s' 'LEADING-CHUNK'\nsleep 30\n",
        pid_file.display()
    );
    std::fs::write(&path, script).expect("failed to write hanging encoder");
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}
