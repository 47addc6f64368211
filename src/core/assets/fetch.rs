//! Remote retrieval of known-good artifacts.

use crate::core::errors::BoxError;
use std::time::Duration;
use tracing::info;

/// Retrieves the body behind a URL.
///
/// Implementations make exactly one attempt per call.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BoxError>;
}

/// Plain HTTP GET with a fixed timeout and no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BoxError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| format!("Failed to fetch URL: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()).into());
        }

        let bytes = response
            .bytes()
            .map_err(|e| format!("Failed to read response body: {}", e))?;
        info!(url, bytes = bytes.len(), "fetched remote asset");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Accepts connections on a local port and hands each one to `serve`.
    fn local_server(serve: fn(TcpStream)) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/tokenizer.json", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&connections);
        std::thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                seen.fetch_add(1, Ordering::SeqCst);
                std::thread::spawn(move || serve(stream));
            }
        });
        (url, connections)
    }

    #[test]
    fn test_silent_server_times_out_after_one_attempt() {
        let (url, connections) = local_server(|stream| {
            // hold the connection open without answering
            std::thread::sleep(Duration::from_secs(5));
            drop(stream);
        });

        let start = Instant::now();
        let result = HttpFetcher::new(Duration::from_millis(300)).fetch(&url);
        let elapsed = start.elapsed();

        assert!(result.is_err());
        assert!(elapsed < Duration::from_secs(2), "fetch took {elapsed:?}");
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_status_is_a_fetch_failure() {
        let (url, connections) = local_server(|mut stream| {
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        });

        let err = HttpFetcher::new(Duration::from_secs(2)).fetch(&url).unwrap_err();
        assert!(err.to_string().contains("404"), "unexpected error: {err}");
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_success_returns_body() {
        let (url, _) = local_server(|mut stream| {
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
            );
        });

        let body = HttpFetcher::new(Duration::from_secs(2)).fetch(&url).unwrap();
        assert_eq!(body, b"{}");
    }
}
