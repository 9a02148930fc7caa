use reqwest::header::CONTENT_TYPE;
use snafu::ResultExt;
use tracing::{info, warn};

use crate::backups::BackupRecord;
use crate::config::Config;
use crate::error::{self, Result};

pub const DEFAULT_BASE_URL: &str =
    "https://localhost:8443/plugins/StationeersBackupManager/api/v1";

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    pub client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, accept_invalid_certs: bool) -> Result<ApiClient> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(error::ClientBuildSnafu)?;
        Ok(ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<ApiClient> {
        Self::new(&config.base_url, config.accept_invalid_certs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn backups_url(&self, limit: Option<u32>) -> String {
        match limit {
            Some(limit) => format!("{}/backups?limit={}", self.base_url, limit),
            None => format!("{}/backups", self.base_url),
        }
    }

    pub fn restore_url(&self, index: i64) -> String {
        format!("{}/backups/restore?index={}", self.base_url, index)
    }

    pub async fn list_backups(&self, limit: Option<u32>) -> Result<Listing> {
        let url = self.backups_url(limit);
        info!("Requesting: {url}");
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .context(error::ApiGetUrlSnafu { url: &url })?;
        let ok = res.status().is_success();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = res
            .text()
            .await
            .context(error::ApiReadBodySnafu { url: &url })?;
        Listing::from_parts(ok, content_type.as_deref(), &body)
            .context(error::ApiDeserializeSnafu { url })
    }

    /// The restore endpoint answers with a plain text message for success and
    /// failure alike, so the status code is not inspected.
    pub async fn restore_backup(&self, index: i64) -> Result<String> {
        let url = self.restore_url(index);
        info!("Requesting: {url}");
        let text = self
            .client
            .get(&url)
            .send()
            .await
            .context(error::ApiGetUrlSnafu { url: &url })?
            .text()
            .await
            .context(error::ApiReadBodySnafu { url })?;
        Ok(text)
    }
}

/// Read the limit input. Blank means the server default; anything that is
/// not a positive integer is treated the same way.
pub fn parse_limit(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match input.parse::<u32>() {
        Ok(0) | Err(_) => {
            warn!("Ignoring invalid backup limit: {input}");
            None
        }
        Ok(limit) => Some(limit),
    }
}

/// Body of a listing response, split on its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Records { ok: bool, records: Vec<BackupRecord> },
    Text { ok: bool, text: String },
}
impl Listing {
    pub fn from_parts(
        ok: bool,
        content_type: Option<&str>,
        body: &str,
    ) -> std::result::Result<Listing, serde_json::Error> {
        let is_json = content_type.is_some_and(|ct| ct.contains(JSON_CONTENT_TYPE));
        if !is_json {
            return Ok(Listing::Text {
                ok,
                text: body.to_string(),
            });
        }
        // a nil slice on the server side comes through as `null`
        let records: Option<Vec<BackupRecord>> = serde_json::from_str(body)?;
        Ok(Listing::Records {
            ok,
            records: records.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const RECORDS: &str = r#"[
        {"Index": 2, "BinFile": "a.bin", "XMLFile": "a.xml", "MetaFile": "a_meta.xml", "ModTime": "2024-03-01T10:00:00Z"},
        {"Index": 1, "BinFile": "b.save", "XMLFile": "", "MetaFile": "", "ModTime": "2024-02-01T10:00:00Z"}
    ]"#;

    #[test]
    fn test_urls() {
        let client = ApiClient::new("https://host:8443/plugins/Backups/api/v1/", false).unwrap();
        assert_eq!(client.base_url(), "https://host:8443/plugins/Backups/api/v1");
        assert_eq!(
            client.backups_url(None),
            "https://host:8443/plugins/Backups/api/v1/backups"
        );
        assert_eq!(
            client.backups_url(Some(5)),
            "https://host:8443/plugins/Backups/api/v1/backups?limit=5"
        );
        assert_eq!(
            client.restore_url(7),
            "https://host:8443/plugins/Backups/api/v1/backups/restore?index=7"
        );
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(""), None);
        assert_eq!(parse_limit("  "), None);
        assert_eq!(parse_limit("15"), Some(15));
        assert_eq!(parse_limit(" 3 "), Some(3));
        assert_eq!(parse_limit("0"), None);
        assert_eq!(parse_limit("-2"), None);
        assert_eq!(parse_limit("ten"), None);
    }

    #[test]
    fn test_json_listing_keeps_order() {
        let listing =
            Listing::from_parts(true, Some("application/json; charset=utf-8"), RECORDS).unwrap();
        match listing {
            Listing::Records { ok, records } => {
                assert!(ok);
                let indexes: Vec<i64> = records.iter().map(|r| r.index).collect();
                assert_eq!(indexes, vec![2, 1]);
            }
            other => panic!("unexpected listing {other:?}"),
        }
    }

    #[test]
    fn test_null_listing_is_empty() {
        let listing = Listing::from_parts(true, Some("application/json"), "null").unwrap();
        assert_eq!(
            listing,
            Listing::Records {
                ok: true,
                records: vec![]
            }
        );
    }

    #[test]
    fn test_text_listing() {
        let listing = Listing::from_parts(false, Some("text/plain"), "boom").unwrap();
        assert_eq!(
            listing,
            Listing::Text {
                ok: false,
                text: "boom".to_string()
            }
        );
        let listing = Listing::from_parts(true, None, "").unwrap();
        assert!(matches!(listing, Listing::Text { ok: true, .. }));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Listing::from_parts(true, Some("application/json"), "[{").is_err());
    }

    /// Answers a single request with a canned response and hands back the
    /// request head it received.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (base_url, handle)
    }

    #[tokio::test]
    async fn test_list_backups_error_text() {
        let (base_url, server) =
            serve_once("500 Internal Server Error", "text/plain; charset=utf-8", "boom").await;
        let client = ApiClient::new(&base_url, false).unwrap();
        let listing = client.list_backups(None).await.unwrap();
        assert_eq!(
            listing,
            Listing::Text {
                ok: false,
                text: "boom".to_string()
            }
        );
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/v1/backups HTTP/1.1"), "{head}");
    }

    #[tokio::test]
    async fn test_list_backups_records() {
        let (base_url, server) = serve_once("200 OK", "application/json", RECORDS).await;
        let client = ApiClient::new(&base_url, false).unwrap();
        let listing = client.list_backups(Some(2)).await.unwrap();
        let Listing::Records { ok, records } = listing else {
            panic!("unexpected listing {listing:?}");
        };
        assert!(ok);
        assert_eq!(records.iter().map(|r| r.index).collect::<Vec<_>>(), vec![2, 1]);
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/v1/backups?limit=2 HTTP/1.1"), "{head}");
    }

    #[tokio::test]
    async fn test_restore_backup_returns_body() {
        let (base_url, server) =
            serve_once("400 Bad Request", "text/plain", "Backup 7 not found").await;
        let client = ApiClient::new(&base_url, false).unwrap();
        let message = client.restore_backup(7).await.unwrap();
        assert_eq!(message, "Backup 7 not found");
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /api/v1/backups/restore?index=7 HTTP/1.1"), "{head}");
    }
}
