//! Shared helpers for integration tests.
//!
//! [`FakeFfmpeg`] writes a shell script that answers `-version`, logs every
//! other invocation and concatenates its `-i` inputs into the last argument.
//! Trim invocations (`-ss`) prefix the output with `CUT:` so a replaced file
//! can be told apart from its input.
//! [`MockVideo`] mounts a manifest and its stream bodies on a wiremock
//! server.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use clipforged_av::ToolConfig;
use clipforged_core::config::DownloadConfig;
use clipforged_pipeline::{CancellationToken, FetchRequest, Orchestrator};
use clipforged::provider::HttpManifestProvider;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Fake ffmpeg
// ---------------------------------------------------------------------------

pub struct FakeFfmpeg {
    _dir: TempDir,
    pub path: PathBuf,
    pub log: PathBuf,
}

impl FakeFfmpeg {
    /// A fake that succeeds for every invocation.
    pub fn new() -> Self {
        Self::build("")
    }

    /// A fake that exits 1 whenever its arguments contain `flag`.
    pub fn failing_on(flag: &str) -> Self {
        Self::build(&format!(
            "case \" $* \" in *\" {flag} \"*) echo \"fake failure on {flag}\" >&2; exit 1;; esac\n"
        ))
    }

    fn build(fail_check: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffmpeg");
        let log = dir.path().join("invocations.log");

        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 0.0-fake"
  exit 0
fi
echo "$*" >> "{log}"
{fail_check}out=""
inputs=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-i" ]; then inputs="$inputs $arg"; fi
  prev="$arg"
  out="$arg"
done
case " $* " in
  *" -ss "*) printf 'CUT:' > "$out"; cat $inputs >> "$out" ;;
  *) cat $inputs > "$out" ;;
esac
"#,
            log = log.display(),
        );
        std::fs::write(&path, script).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        Self {
            _dir: dir,
            path,
            log,
        }
    }

    pub fn tool(&self) -> ToolConfig {
        ToolConfig::at("ffmpeg", &self.path)
    }

    /// Every invocation except `-version`, one argument string per line.
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }
}

/// Arguments of an invocation with every path dropped.
pub fn flags_only(invocation: &str) -> Vec<String> {
    invocation
        .split_whitespace()
        .filter(|arg| !arg.contains('/'))
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Mock manifest server
// ---------------------------------------------------------------------------

/// One stream served by [`MockVideo`].
pub struct MockStream {
    pub kind: &'static str,
    pub container: &'static str,
    pub quality: u64,
    pub body: Vec<u8>,
    pub status: u16,
    pub delay: Option<Duration>,
}

impl MockStream {
    pub fn new(kind: &'static str, container: &'static str, quality: u64, body: &[u8]) -> Self {
        Self {
            kind,
            container,
            quality,
            body: body.to_vec(),
            status: 200,
            delay: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn file_name(&self, index: usize) -> String {
        format!("{}-{index}.{}", self.kind, self.container)
    }
}

/// A wiremock server hosting `/manifests/<id>.json` and its streams.
pub struct MockVideo {
    pub server: MockServer,
    pub id: String,
}

impl MockVideo {
    pub async fn start(id: &str, title: &str, streams: Vec<MockStream>) -> Self {
        let server = MockServer::start().await;

        let entries: Vec<serde_json::Value> = streams
            .iter()
            .enumerate()
            .map(|(i, s)| {
                serde_json::json!({
                    "kind": s.kind,
                    "container": s.container,
                    "quality": s.quality,
                    // Relative to the manifest URL.
                    "url": format!("../streams/{}", s.file_name(i)),
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/manifests/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": id,
                "title": title,
                "streams": entries,
            })))
            .mount(&server)
            .await;

        for (i, stream) in streams.iter().enumerate() {
            let mut response =
                ResponseTemplate::new(stream.status).set_body_bytes(stream.body.clone());
            if let Some(delay) = stream.delay {
                response = response.set_delay(delay);
            }
            Mock::given(method("GET"))
                .and(path(format!("/streams/{}", stream.file_name(i))))
                .respond_with(response)
                .mount(&server)
                .await;
        }

        Self {
            server,
            id: id.to_string(),
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}/manifests", self.server.uri())
    }

    pub fn manifest_url(&self) -> String {
        format!("{}/{}.json", self.base_url(), self.id)
    }

    pub fn provider(&self) -> HttpManifestProvider {
        HttpManifestProvider::new(&DownloadConfig {
            base_url: Some(self.base_url()),
            ..DownloadConfig::default()
        })
        .unwrap()
    }

    pub fn orchestrator(&self, ffmpeg: &FakeFfmpeg) -> Orchestrator {
        Orchestrator::new(std::sync::Arc::new(self.provider()), ffmpeg.tool())
    }

    pub fn orchestrator_with_cancel(
        &self,
        ffmpeg: &FakeFfmpeg,
        token: CancellationToken,
    ) -> Orchestrator {
        self.orchestrator(ffmpeg).with_cancellation(token)
    }
}

// ---------------------------------------------------------------------------
// Filesystem assertions
// ---------------------------------------------------------------------------

/// Request writing `name` inside `dir`.
pub fn request(video: &MockVideo, dir: &Path, name: &str) -> FetchRequest {
    FetchRequest::new(video.id.clone(), dir.join(name))
}

/// Names of everything in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
