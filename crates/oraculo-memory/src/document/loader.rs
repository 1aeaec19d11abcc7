use url::Url;

use super::types::{Document, DocumentMetadata};
use crate::error::DocumentError;

/// Fetches one web page and extracts the text of an allow-listed set of
/// content regions, given as CSS selectors.
#[derive(Debug, Clone)]
pub struct WebLoader {
    client: reqwest::Client,
    selector: String,
    max_body_bytes: usize,
}

impl WebLoader {
    /// The selectors are joined into a single group selector so matches come
    /// back in document order rather than grouped per selector.
    #[must_use]
    pub fn new(selectors: &[String], max_body_bytes: usize) -> Self {
        Self {
            client: oraculo_llm::http::default_client(),
            selector: selectors.join(", "),
            max_body_bytes,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch the page and yield the filtered regions as one `Document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the request fails or times
    /// out, the body exceeds the size cap, or no region matches.
    pub async fn load(&self, url: &str) -> Result<Document, DocumentError> {
        let parsed = Url::parse(url)?;
        let html = self.fetch_html(parsed.as_str()).await?;
        let content = extract_regions(&html, &self.selector)?;

        tracing::debug!(url, chars = content.chars().count(), "document loaded");

        Ok(Document {
            content,
            metadata: DocumentMetadata {
                source: parsed.to_string(),
                content_type: "text/html".to_owned(),
            },
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, DocumentError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DocumentError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        if bytes.len() > self.max_body_bytes {
            return Err(DocumentError::BodyTooLarge {
                got: bytes.len(),
                max: self.max_body_bytes,
            });
        }

        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

fn extract_regions(html: &str, selector: &str) -> Result<String, DocumentError> {
    let soup = scrape_core::Soup::parse(html);

    let tags = soup
        .find_all(selector)
        .map_err(|e| DocumentError::Selector(e.to_string()))?;

    let mut parts = Vec::new();
    for tag in tags {
        let text = tag.text();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_owned());
        }
    }

    if parts.is_empty() {
        return Err(DocumentError::NoContent);
    }

    Ok(parts.join("\n"))
}
