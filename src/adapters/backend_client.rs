use crate::domain::model::{ImageFormat, ImagePayload, Product};
use crate::domain::ports::{CatalogSource, ConfigProvider};
use crate::utils::error::{Result, SmartFitError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Reads the catalog from the SmartFit API and downloads garment images.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    base_url: String,
    client: Client,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.backend_url(), config.request_timeout())
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let url = format!("{}/api/products", self.base_url);
        tracing::debug!("GET {}", url);

        let products = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Product>>()
            .await?;

        tracing::debug!("Fetched {} products", products.len());
        Ok(products)
    }

    async fn get_product(&self, id: u32) -> Result<Product> {
        let url = format!("{}/api/products/{}", self.base_url, id);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SmartFitError::NotFound {
                resource: "Product".to_string(),
                id: id.to_string(),
            });
        }

        Ok(response.error_for_status()?.json::<Product>().await?)
    }

    async fn fetch_image(&self, url: &str) -> Result<ImagePayload> {
        tracing::debug!("Downloading garment image {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let declared = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| ImageFormat::from_mime(v.split(';').next().unwrap_or(v)));
        let bytes = response.bytes().await?.to_vec();

        match ImageFormat::detect(&bytes).or(declared) {
            Some(format) => Ok(ImagePayload::new(bytes, format)),
            None => Err(SmartFitError::Image {
                message: format!("{} is not a PNG or JPEG image", url),
            }),
        }
    }
}
