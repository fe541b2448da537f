// Dataset download and unpacking
//
// One GET with a bounded timeout, no retry. Archives are unpacked on a
// blocking task since flate2/zip readers are synchronous.

use flate2::read::GzDecoder;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Url};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use zip::ZipArchive;

use crate::error::{LookupError, Result};
use crate::lookup::remote::response_error;

/// Download a dataset into `dest_dir` and return the path of the usable file
///
/// With `api_key` the request carries `?api=<key>`.
pub async fn download_dataset(
    url: &str,
    api_key: Option<&str>,
    dest_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf> {
    log::info!("Downloading dataset from {}", url);

    fs::create_dir_all(dest_dir).await?;

    let client = Client::builder()
        .user_agent(concat!("dxlookup/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| LookupError::Transport(format!("failed to create HTTP client: {}", e)))?;

    let mut request = client.get(url);
    if let Some(key) = api_key {
        request = request.query(&[("api", key)]);
    }
    let response = request.send().await?;

    let status = response.status();
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_disposition);

    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::debug!("Could not read error body from {}: {}", url, e);
                String::new()
            }
        };
        return Err(response_error(status, &body));
    }

    let filename = disposition
        .or_else(|| filename_from_url(url))
        .unwrap_or_else(|| format!("cty_{}", chrono::Utc::now().timestamp_millis()));

    let bytes = response.bytes().await?;
    log::info!("Downloaded {} ({} bytes)", filename, bytes.len());

    let dest = dest_dir.to_path_buf();
    let payload = bytes.to_vec();
    let path = tokio::task::spawn_blocking(move || unpack_payload(&filename, &payload, &dest))
        .await
        .map_err(|e| LookupError::Transport(format!("download task failed: {}", e)))??;

    log::info!("Dataset ready at {}", path.display());
    Ok(path)
}

/// File name from a `Content-Disposition` header value
pub fn filename_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"'))
        .and_then(safe_file_name)
}

/// Last path segment of `url`, if any
pub fn filename_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    safe_file_name(segment)
}

/// Keep only the final path component so a server cannot write outside the cache
fn safe_file_name(name: &str) -> Option<String> {
    let base = Path::new(name).file_name()?.to_str()?;
    if base.is_empty() || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Write a downloaded payload to `dest_dir`, unpacking gzip or zip
///
/// `name.gz` is stored gunzipped as `name`. A zip archive yields its first
/// `.xml` or `.plist` member. Anything else is written unchanged.
pub fn unpack_payload(filename: &str, payload: &[u8], dest_dir: &Path) -> Result<PathBuf> {
    let lower = filename.to_lowercase();

    if lower.ends_with(".gz") {
        let mut decoder = GzDecoder::new(payload);
        let mut contents = Vec::new();
        decoder.read_to_end(&mut contents).map_err(|e| {
            LookupError::SourceCorrupt(format!("failed to gunzip {}: {}", filename, e))
        })?;
        let stem = Path::new(filename).file_stem().unwrap_or_default();
        let path = dest_dir.join(stem);
        std::fs::write(&path, &contents)?;
        log::debug!("Gunzipped {} to {} bytes", filename, contents.len());
        return Ok(path);
    }

    if lower.ends_with(".zip") {
        return extract_dataset_member(filename, payload, dest_dir);
    }

    let path = dest_dir.join(filename);
    std::fs::write(&path, payload)?;
    Ok(path)
}

fn extract_dataset_member(filename: &str, payload: &[u8], dest_dir: &Path) -> Result<PathBuf> {
    let mut archive = ZipArchive::new(Cursor::new(payload))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_lowercase();
        if !(name.ends_with(".xml") || name.ends_with(".plist")) {
            continue;
        }
        let member = safe_file_name(file.name()).ok_or_else(|| {
            LookupError::SourceCorrupt(format!("bad member name in {}: {}", filename, file.name()))
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        let path = dest_dir.join(&member);
        std::fs::write(&path, &contents)?;
        log::debug!("Extracted {} from {} ({} bytes)", member, filename, contents.len());
        return Ok(path);
    }

    Err(LookupError::SourceCorrupt(format!(
        "no .xml or .plist file found in {}",
        filename
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const PAYLOAD: &[u8] = b"<clublog></clublog>";

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn zip_with(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in members {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Answer a single HTTP request on a local port, return the URL to fetch
    async fn serve_once(
        status: &'static str,
        headers: &'static str,
        body: &'static str,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let reply = format!(
                "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                headers,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/cty.php", addr)
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="cty.xml.gz""#),
            Some("cty.xml.gz".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=cty.plist"),
            Some("cty.plist".to_string())
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../etc/cty.xml""#),
            Some("cty.xml".to_string())
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://www.country-files.com/cty/cty.plist"),
            Some("cty.plist".to_string())
        );
        assert_eq!(
            filename_from_url("https://secure.clublog.org/cty.php?api=abc"),
            Some("cty.php".to_string())
        );
        assert_eq!(filename_from_url("https://example.com/"), None);
        assert_eq!(filename_from_url("not a url"), None);
    }

    #[test]
    fn test_unpack_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = unpack_payload("cty.xml.gz", &gzip(PAYLOAD), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("cty.xml"));
        assert_eq!(std::fs::read(&path).unwrap(), PAYLOAD);
    }

    #[test]
    fn test_unpack_bad_gzip_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let result = unpack_payload("cty.xml.gz", b"plain text", dir.path());
        assert!(matches!(result, Err(LookupError::SourceCorrupt(_))));
    }

    #[test]
    fn test_unpack_zip_takes_first_dataset_member() {
        let dir = tempfile::tempdir().unwrap();
        let archive = zip_with(&[
            ("README.txt", &b"ignore me"[..]),
            ("cty/cty.plist", &b"<plist/>"[..]),
            ("cty.xml", PAYLOAD),
        ]);
        let path = unpack_payload("cty.zip", &archive, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("cty.plist"));
        assert_eq!(std::fs::read(&path).unwrap(), b"<plist/>");
    }

    #[test]
    fn test_unpack_zip_without_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let archive = zip_with(&[("README.txt", &b"nothing here"[..])]);
        assert!(matches!(
            unpack_payload("cty.zip", &archive, dir.path()),
            Err(LookupError::SourceCorrupt(_))
        ));
    }

    #[test]
    fn test_plain_payload_is_written_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = unpack_payload("cty.plist", b"<plist/>", dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<plist/>");
    }

    #[tokio::test]
    async fn test_key_error_body_is_credential_missing() {
        let url = serve_once("400 Bad Request", "", "Invalid or missing API Key").await;
        let dir = tempfile::tempdir().unwrap();
        let result = download_dataset(&url, Some("bad"), dir.path(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(LookupError::CredentialMissing)));
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let url = serve_once("500 Internal Server Error", "", "boom").await;
        let dir = tempfile::tempdir().unwrap();
        let result = download_dataset(&url, Some("key"), dir.path(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(LookupError::Transport(ref m)) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_forbidden_without_key_body_is_transport_error() {
        let url = serve_once("403 Forbidden", "", "<html>403 Forbidden</html>").await;
        let dir = tempfile::tempdir().unwrap();
        let result = download_dataset(&url, None, dir.path(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(LookupError::Transport(_))));
    }

    #[tokio::test]
    async fn test_download_uses_disposition_name() {
        let url = serve_once(
            "200 OK",
            "Content-Disposition: attachment; filename=\"cty.plist\"\r\n",
            "<plist/>",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let path = download_dataset(&url, None, dir.path(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("cty.plist"));
        assert_eq!(std::fs::read(&path).unwrap(), b"<plist/>");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = download_dataset(
            "http://127.0.0.1:9/cty.plist",
            None,
            dir.path(),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(LookupError::Transport(_))));
    }
}
