//! Resource retrieval for the manifest and layer payloads.
//!
//! The pipeline only needs "give me the status and body at this path", so
//! retrieval sits behind a small trait. On WASM it is the browser `fetch`
//! API; on native it reads files relative to the working directory.

use std::future::Future;

/// A completed retrieval: HTTP-style status plus the body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves resources by path.
///
/// `Err` means the request never produced a response (network failure,
/// blocked request, I/O error other than a missing file).
///
/// Note: no `Send` bound, the browser implementation holds JS values.
pub trait ResourceFetcher {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<FetchResponse, String>>;
}

/// Joins a base path and a relative resource name with exactly one `/`.
pub fn resource_path(base: &str, file: &str) -> String {
    let base = base.trim_end_matches('/');
    let file = file.trim_start_matches('/');
    if base.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", base, file)
    }
}

/// Browser fetch.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebFetcher;

#[cfg(target_arch = "wasm32")]
impl ResourceFetcher for WebFetcher {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, String> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let window = web_sys::window().ok_or_else(|| "No window".to_string())?;

        let response = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;
        let response: web_sys::Response = response
            .dyn_into()
            .map_err(|_| "fetch did not resolve to a Response".to_string())?;

        let status = response.status();
        if !response.ok() {
            return Ok(FetchResponse::new(status, String::new()));
        }

        let text = response
            .text()
            .map_err(|e| format!("Failed to read body: {:?}", e))?;
        let body = JsFuture::from(text)
            .await
            .map_err(|e| format!("Failed to read body: {:?}", e))?
            .as_string()
            .unwrap_or_default();

        Ok(FetchResponse { status, body })
    }
}

/// Reads resources from the local filesystem, answering 404 for missing files.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[cfg(not(target_arch = "wasm32"))]
impl ResourceFetcher for FileFetcher {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, String> {
        match std::fs::read_to_string(path) {
            Ok(body) => Ok(FetchResponse::new(200, body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(FetchResponse::new(404, String::new()))
            }
            Err(e) => Err(format!("Failed to read {}: {}", path, e)),
        }
    }
}

/// The fetcher used by the running application on this platform.
#[cfg(target_arch = "wasm32")]
pub type PlatformFetcher = WebFetcher;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformFetcher = FileFetcher;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path_joins_with_single_slash() {
        assert_eq!(resource_path("/data/outdoors", "index.json"), "/data/outdoors/index.json");
        assert_eq!(resource_path("/data/outdoors/", "/paths.json"), "/data/outdoors/paths.json");
        assert_eq!(resource_path("", "index.json"), "index.json");
    }

    #[test]
    fn test_success_range() {
        assert!(FetchResponse::new(200, "").is_success());
        assert!(FetchResponse::new(204, "").is_success());
        assert!(!FetchResponse::new(304, "").is_success());
        assert!(!FetchResponse::new(404, "").is_success());
        assert!(!FetchResponse::new(0, "").is_success());
    }
}
