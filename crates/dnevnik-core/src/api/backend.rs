use std::future::Future;
use std::sync::Arc;

/// Minimal HTTP backend used by [`ApiClient`](super::ApiClient).
///
/// Implemented for `reqwest::Client`; tests substitute a scripted client.
pub trait HttpClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a request and return the full response.
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, Self::Error>> + Send;

    /// Whether `error` means the backend gave up waiting for the server.
    fn is_timeout(_error: &Self::Error) -> bool {
        false
    }
}

impl HttpClient for reqwest::Client {
    type Error = reqwest::Error;

    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, Self::Error> {
        let (parts, body) = request.into_parts();

        let resp = self
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await?;

        let mut response = http::Response::new(Vec::new());
        *response.status_mut() = resp.status();
        *response.headers_mut() = resp.headers().clone();
        *response.body_mut() = resp.bytes().await?.to_vec();
        Ok(response)
    }

    fn is_timeout(error: &Self::Error) -> bool {
        error.is_timeout()
    }
}

impl<T: HttpClient + Send + Sync> HttpClient for Arc<T> {
    type Error = T::Error;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, Self::Error>> + Send {
        self.as_ref().send_http(request)
    }

    fn is_timeout(error: &Self::Error) -> bool {
        T::is_timeout(error)
    }
}
