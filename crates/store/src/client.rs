//! S3 HTTP client.
//!
//! Blocking reqwest client, path-style addressing (`{endpoint}/{bucket}/{key}`)
//! so S3-compatible stores work with a plain endpoint override.

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use reqwest::blocking::Response;
use reqwest::{Method, StatusCode, Url};
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;
use crate::error::StoreError;
use crate::signing::{self, CanonicalRequest};
use crate::xml;
use crate::ObjectStore;

pub const DEFAULT_REGION: &str = "us-east-1";

/// DeleteObjects accepts at most this many keys per request.
const DELETE_BATCH: usize = 1000;

/// S3 client (blocking).
pub struct S3Client {
    http: reqwest::blocking::Client,
    endpoint: Url,
    bucket: String,
    region: String,
    creds: Credentials,
}

impl S3Client {
    /// Client for `bucket`. `endpoint` overrides the regional AWS endpoint.
    pub fn new(
        creds: Credentials,
        bucket: &str,
        region: &str,
        endpoint: Option<&str>,
    ) -> Result<Self, StoreError> {
        let endpoint = match endpoint {
            Some(e) => e.trim_end_matches('/').to_string(),
            None => format!("https://s3.{region}.amazonaws.com"),
        };
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| StoreError::Parse(format!("invalid endpoint '{endpoint}': {e}")))?;
        if endpoint.host_str().is_none() {
            return Err(StoreError::Parse(format!("endpoint '{endpoint}' has no host")));
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("coresync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            bucket: bucket.to_string(),
            region: region.to_string(),
            creds,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// ListObjectsV2 over every page.
    fn list(&self, prefix: &str, delimiter: Option<&str>) -> Result<xml::ListPage, StoreError> {
        let mut all = xml::ListPage::default();
        let mut token: Option<String> = None;

        loop {
            let mut params = vec![("list-type", "2"), ("prefix", prefix)];
            if let Some(d) = delimiter {
                params.push(("delimiter", d));
            }
            if let Some(ref t) = token {
                params.push(("continuation-token", t.as_str()));
            }

            let body = self.send(Method::GET, "", &params, Vec::new(), Vec::new())?.text()?;
            let page = xml::parse_list_page(&body)?;
            log::debug!(
                "listed {} keys, {} prefixes under s3://{}/{}",
                page.keys.len(),
                page.prefixes.len(),
                self.bucket,
                prefix
            );

            all.keys.extend(page.keys);
            all.prefixes.extend(page.prefixes);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(all)
    }

    /// Delete `keys` with one DeleteObjects call. Returns how many were deleted.
    fn delete_batch(&self, keys: &[String]) -> Result<usize, StoreError> {
        let body = xml::delete_request_body(keys).into_bytes();
        let checksum = base64::engine::general_purpose::STANDARD.encode(Sha256::digest(&body));
        let headers = vec![
            ("content-type".to_string(), "application/xml".to_string()),
            ("x-amz-checksum-sha256".to_string(), checksum),
        ];

        let text = self
            .send(Method::POST, "", &[("delete", "")], body, headers)?
            .text()?;
        let report = xml::parse_delete_result(&text)?;
        for (key, message) in &report.errors {
            log::error!("could not delete s3://{}/{}: {}", self.bucket, key, message);
        }
        Ok(report.deleted)
    }

    /// Sign and send one request. `key` is empty for bucket-level calls.
    /// Non-success statuses become [`StoreError::Http`].
    fn send(
        &self,
        method: Method,
        key: &str,
        params: &[(&str, &str)],
        body: Vec<u8>,
        extra_headers: Vec<(String, String)>,
    ) -> Result<Response, StoreError> {
        let uri = if key.is_empty() {
            format!("/{}", signing::uri_encode(&self.bucket, false))
        } else {
            format!(
                "/{}/{}",
                signing::uri_encode(&self.bucket, false),
                signing::uri_encode(key, true)
            )
        };
        let query = signing::canonical_query(params);
        let base = self.endpoint.as_str().trim_end_matches('/');
        let url = if query.is_empty() {
            format!("{base}{uri}")
        } else {
            format!("{base}{uri}?{query}")
        };

        let payload_hash = signing::sha256_hex(&body);
        let amz_date = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = vec![
            ("host".to_string(), self.host_header()),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        headers.extend(extra_headers);

        let authorization = signing::authorization(
            &self.creds,
            &self.region,
            "s3",
            &amz_date,
            &CanonicalRequest {
                method: method.as_str(),
                uri: &uri,
                query: &query,
                headers: &headers,
                payload_hash: &payload_hash,
            },
        );

        let mut req = self.http.request(method, &url).header("Authorization", authorization);
        for (name, value) in headers.iter().filter(|(name, _)| name != "host") {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.body(body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// `Host` exactly as reqwest will send it: the port only when non-default.
    fn host_header(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

impl ObjectStore for S3Client {
    fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.list(prefix, Some("/"))?.prefixes)
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.list(prefix, None)?.keys)
    }

    fn head(&self, key: &str) -> Result<bool, StoreError> {
        match self.send(Method::HEAD, key, &[], Vec::new(), Vec::new()) {
            Ok(_) => Ok(true),
            Err(StoreError::Http { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let keys = self.list_keys(prefix)?;
        if keys.is_empty() {
            log::debug!("nothing to delete under s3://{}/{}", self.bucket, prefix);
            return Ok(0);
        }

        let mut deleted = 0;
        for batch in keys.chunks(DELETE_BATCH) {
            deleted += self.delete_batch(batch)?;
        }
        log::info!("deleted {} objects under s3://{}/{}", deleted, self.bucket, prefix);
        Ok(deleted)
    }

    fn upload(&self, path: &Path, key: &str) -> Result<(), StoreError> {
        let data = std::fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let headers = vec![("content-type".to_string(), content_type(path).to_string())];
        self.send(Method::PUT, key, &[], data, headers)?;
        log::info!("uploaded {} -> s3://{}/{}", path.display(), self.bucket, key);
        Ok(())
    }
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "html" | "htm" => "text/html",
        "txt" | "md" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
