use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use reqwest::blocking::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::models::{GifImage, RawGif, SessionCache, TrendingResponse, CACHE_TTL_SECS};

const BASE_URL: &str = "https://api.giphy.com/v1/gifs/trending";

lazy_static! {
    // Fixed request parameters, serialized in declaration order.
    static ref QUERY_PARAMS: Vec<(&'static str, &'static str)> = vec![
        ("api_key", "a6a04743458b4a239bade3bea5c802b3"),
        ("limit", "20"),
        ("rating", "g"),
    ];
}

// Joins the parameters as-is; every value in QUERY_PARAMS is URL-safe, so
// no percent-encoding is applied.
pub fn build_query_string(params: &[(&str, &str)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    format!("?{}", pairs.join("&"))
}

pub fn to_gif_images(raw: Vec<RawGif>) -> Vec<GifImage> {
    raw.into_iter().map(GifImage::from).collect()
}

#[derive(Clone)]
pub struct GiphyClient {
    client: Client,
    pub(crate) cache: Arc<Mutex<SessionCache>>,
    pub(crate) cache_ttl_secs: u64,
}

impl GiphyClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("gif-lightbox/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            cache: Arc::new(Mutex::new(SessionCache::new())),
            cache_ttl_secs: CACHE_TTL_SECS,
        }
    }

    // Allow configuring the cache TTL
    #[allow(dead_code)]
    pub fn set_cache_ttl(&mut self, seconds: u64) {
        self.cache_ttl_secs = seconds;
    }

    // Serves the session cache when it is still fresh, otherwise goes to
    // the network.
    pub fn fetch_trending(&self) -> Result<Vec<GifImage>> {
        if let Ok(cache) = self.cache.try_lock() {
            if let Some(gifs) = cache.load_gifs(self.cache_ttl_secs) {
                return Ok(gifs);
            }
        }

        self.fetch_fresh_trending()
    }

    // Always hits the network, then refreshes the session cache. Used
    // directly for forced refreshes (shift+click on the trigger).
    pub fn fetch_fresh_trending(&self) -> Result<Vec<GifImage>> {
        let url = format!("{}{}", BASE_URL, build_query_string(&QUERY_PARAMS));
        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Trending request returned status of {}",
                response.status()
            ));
        }

        let body: TrendingResponse = response.json()?;
        let gifs = to_gif_images(body.data);

        // Update the cache, but don't block the fetch on the lock.
        if let Ok(mut cache) = self.cache.try_lock() {
            if let Err(e) = cache.store_gifs(&gifs) {
                eprintln!("Failed to cache trending gifs: {}", e);
            }
        }

        Ok(gifs)
    }

    pub fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Image request returned status of {}",
                response.status()
            ));
        }

        Ok(response.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawImageFormats, RawRendition};

    #[test]
    fn query_string_joins_pairs_in_order() {
        let params = [("a", "1"), ("b", "g")];

        assert_eq!(build_query_string(&params), "?a=1&b=g");
    }

    #[test]
    fn fixed_params_serialize_deterministically() {
        let query = build_query_string(&QUERY_PARAMS);

        assert!(query.starts_with("?api_key="));
        assert!(query.ends_with("&limit=20&rating=g"));
    }

    #[test]
    fn transform_keeps_order_and_defaults_missing_sources() {
        let raw = vec![
            RawGif {
                images: RawImageFormats {
                    downsized: RawRendition {
                        url: "u1".to_string(),
                    },
                },
                source_tld: Some("x.com".to_string()),
            },
            RawGif {
                images: RawImageFormats {
                    downsized: RawRendition {
                        url: "u2".to_string(),
                    },
                },
                source_tld: None,
            },
        ];

        let gifs = to_gif_images(raw);

        assert_eq!(
            gifs,
            vec![
                GifImage {
                    url: "u1".to_string(),
                    source: "x.com".to_string(),
                },
                GifImage {
                    url: "u2".to_string(),
                    source: "Unknown".to_string(),
                },
            ]
        );
    }

    #[test]
    fn trending_response_parses_giphy_shape() {
        let body = r#"{
            "data": [
                {
                    "images": {"downsized": {"url": "https://media.test/a.gif"}},
                    "source_tld": "example.com"
                },
                {
                    "images": {"downsized": {"url": "https://media.test/b.gif"}}
                }
            ]
        }"#;

        let parsed: TrendingResponse = serde_json::from_str(body).unwrap();
        let gifs = to_gif_images(parsed.data);

        assert_eq!(gifs.len(), 2);
        assert_eq!(gifs[0].source, "example.com");
        assert_eq!(gifs[1].source, "Unknown");
    }
}
