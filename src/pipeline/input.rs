//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! The glyph backend opens documents by file-system path only, so a URL is
//! fetched into a `TempDir` whose lifetime is tied to the returned
//! [`ResolvedInput`]. Either way the first bytes are sniffed for the `%PDF`
//! magic before extraction starts; handing the backend an HTML error page
//! or a mislabelled download would otherwise surface as an opaque crash
//! deep inside page parsing.

use crate::error::ExtractError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input — either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; the manual was downloaded to a temp directory.
    /// The `TempDir` is kept alive to delay cleanup until extraction ends.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local PDF file path.
///
/// A URL is downloaded to a temporary directory; a local path is validated
/// for existence, readability, and PDF magic bytes.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, ExtractError> {
    if input.trim().is_empty() {
        return Err(ExtractError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        fetch_remote(input, timeout_secs).await
    } else {
        open_local(input)
    }
}

/// The offending magic bytes when `head` does not start a PDF. Fewer than
/// four bytes of content is left for the backend to reject.
fn sniff_non_pdf(head: &[u8]) -> Option<[u8; 4]> {
    if head.len() >= 4 && &head[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&head[..4]);
        return Some(magic);
    }
    None
}

fn open_local(path_str: &str) -> Result<ResolvedInput, ExtractError> {
    let path = PathBuf::from(path_str);

    let mut head = [0u8; 4];
    match std::fs::File::open(&path).and_then(|mut f| f.read(&mut head)) {
        Ok(n) => {
            if let Some(magic) = sniff_non_pdf(&head[..n]) {
                return Err(ExtractError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => return Err(ExtractError::FileNotFound { path }),
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn fetch_remote(url: &str, timeout_secs: u64) -> Result<ResolvedInput, ExtractError> {
    info!("Downloading manual from: {}", url);
    let failed = |reason: String| ExtractError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ExtractError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }
    let body = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    let temp_dir = TempDir::new().map_err(|e| ExtractError::Internal(e.to_string()))?;
    let path = temp_dir.path().join(remote_file_name(url));

    if let Some(magic) = sniff_non_pdf(&body) {
        return Err(ExtractError::NotAPdf { path, magic });
    }
    tokio::fs::write(&path, &body)
        .await
        .map_err(|e| ExtractError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", path.display());
    Ok(ResolvedInput::Downloaded {
        path,
        _temp_dir: temp_dir,
    })
}

/// A reasonable filename from the URL path, for the temp file.
fn remote_file_name(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()?
                .next_back()
                .filter(|segment| segment.contains('.'))
                .map(str::to_string)
        })
        .unwrap_or_else(|| "manual.pdf".to_string())
}
