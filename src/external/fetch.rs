//! Downloading content referenced by URL
//!
//! Size limits per category:
//!
//! | Category | Limit |
//! |----------|-------|
//! | text     | 1 MB  |
//! | image    | 50 MB |
//! | audio    | 100 MB |
//! | video    | 500 MB |

use super::{check_status, client, ExternalError};
use crate::classify::ContentCategory;
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

const MB: u64 = 1024 * 1024;

pub fn size_limit(category: ContentCategory) -> u64 {
    match category {
        ContentCategory::Text => MB,
        ContentCategory::Image => 50 * MB,
        ContentCategory::Audio => 100 * MB,
        ContentCategory::Video | ContentCategory::Unknown => 500 * MB,
    }
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, ExternalError> {
        Ok(Self {
            client: client(timeout)?,
        })
    }

    /// GET `url`, refusing bodies larger than the category's limit
    pub fn fetch(&self, url: &str, category: ContentCategory) -> Result<Vec<u8>, ExternalError> {
        let limit = size_limit(category);
        let response = check_status(self.client.get(url).send()?)?;

        if let Some(len) = response.content_length() {
            if len > limit {
                return Err(ExternalError::TooLarge(limit));
            }
        }

        let mut body = Vec::new();
        response
            .take(limit + 1)
            .read_to_end(&mut body)
            .map_err(|e| ExternalError::Decode(e.to_string()))?;
        check_size(body.len(), limit)?;

        debug!(url, bytes = body.len(), category = %category, "fetched content");
        Ok(body)
    }

    pub fn fetch_text(&self, url: &str) -> Result<String, ExternalError> {
        let body = self.fetch(url, ContentCategory::Text)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn check_size(len: usize, limit: u64) -> Result<(), ExternalError> {
    if len as u64 > limit {
        return Err(ExternalError::TooLarge(limit));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_grow_with_media_weight() {
        assert_eq!(size_limit(ContentCategory::Text), 1024 * 1024);
        assert_eq!(size_limit(ContentCategory::Image), 50 * 1024 * 1024);
        assert_eq!(size_limit(ContentCategory::Audio), 100 * 1024 * 1024);
        assert_eq!(size_limit(ContentCategory::Video), 500 * 1024 * 1024);
    }

    #[test]
    fn test_check_size_boundary() {
        assert!(check_size(1024, 1024).is_ok());
        assert!(matches!(check_size(1025, 1024), Err(ExternalError::TooLarge(1024))));
    }
}
