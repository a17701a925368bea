use bytes::Bytes;
use reqwest::Client;
use url::Url;

use super::error::ApiError;
use super::ApiRequest;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&mut self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            let status = response.status();
            Err(ApiError::from_response(status, &response.text().await?))
        }
    }

    /// GET a raw body, for routes that don't speak JSON (logs, archives)
    pub async fn fetch(&self, path: &str) -> Result<Bytes, ApiError> {
        let url = self.remote.join(path)?;
        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            Ok(response.bytes().await?)
        } else {
            let status = response.status();
            Err(ApiError::from_response(status, &response.text().await?))
        }
    }
}
