use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Session cache keys and expiry. An entry older than the TTL is a miss.
pub const TIMESTAMP_KEY: &str = "gg_timestamp";
pub const IMAGES_KEY: &str = "gg_images";
pub const CACHE_TTL_SECS: u64 = 60 * 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifImage {
    pub url: String,
    pub source: String,
}

// Serde mirror of the Giphy trending response, limited to the fields the
// lightbox displays.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingResponse {
    pub data: Vec<RawGif>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGif {
    pub images: RawImageFormats,
    pub source_tld: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImageFormats {
    pub downsized: RawRendition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRendition {
    pub url: String,
}

impl From<RawGif> for GifImage {
    fn from(raw: RawGif) -> Self {
        let source = match raw.source_tld {
            Some(tld) if !tld.is_empty() => tld,
            _ => "Unknown".to_string(),
        };

        Self {
            url: raw.images.downsized.url,
            source,
        }
    }
}

// Session-scoped string store holding the last fetch under two fixed keys:
// an RFC 3339 fetch instant and a JSON-serialized gif list. Dropped with
// the process, so it never outlives the session.
pub struct SessionCache {
    entries: HashMap<String, String>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn is_valid(&self, ttl_secs: u64) -> bool {
        let timestamp = match self.get_item(TIMESTAMP_KEY) {
            Some(value) => value,
            None => return false,
        };

        if self.get_item(IMAGES_KEY).is_none() {
            return false;
        }

        match DateTime::parse_from_rfc3339(timestamp) {
            Ok(fetched_at) => {
                let elapsed = Utc::now().signed_duration_since(fetched_at.with_timezone(&Utc));
                elapsed.num_seconds() < ttl_secs as i64
            }
            Err(_) => false,
        }
    }

    pub fn store_gifs(&mut self, gifs: &[GifImage]) -> anyhow::Result<()> {
        let blob = serde_json::to_string(gifs)?;

        self.set_item(IMAGES_KEY, blob);
        self.set_item(TIMESTAMP_KEY, Utc::now().to_rfc3339());

        Ok(())
    }

    // A malformed blob is treated the same as an expired or absent one.
    pub fn load_gifs(&self, ttl_secs: u64) -> Option<Vec<GifImage>> {
        if !self.is_valid(ttl_secs) {
            return None;
        }

        serde_json::from_str(self.get_item(IMAGES_KEY)?).ok()
    }
}
