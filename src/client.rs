//! GeoNames lookup client.
//!
//! One configured HTTP client reused across requests; base URL and defaults
//! are fixed at construction. Every search is a single GET against
//! `searchJSON` that suspends the caller until the response settles.

use crate::model::SearchConfig;
use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;

/// Characters escaped in query parameter values. Beyond the usual query-string
/// set this covers `&`, `=`, `+` and space so a value can never break the
/// parameter structure; space must come out as `%20`, never `+`.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A single record from the lookup service. Every field is optional on the
/// wire; absent fields decode to the stated defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CityRecord {
    pub name: String,
    /// First-level administrative region (state/province).
    pub admin_name1: String,
    pub country_name: String,
    pub country_code: String,
    pub lat: String,
    pub lng: String,
    pub population: u64,
}

/// Wire-level search response. `total_results_count` may exceed the record
/// count when the server truncates at `maxRows`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchResponse {
    pub total_results_count: u64,
    pub geonames: Vec<CityRecord>,
}

pub struct GeoNamesClient {
    http: reqwest::Client,
    cfg: SearchConfig,
}

impl GeoNamesClient {
    pub fn new(cfg: SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self { http, cfg })
    }

    /// Assemble the request URL by hand. reqwest's `.query()` goes through
    /// form encoding and would emit `+` for a space; the lookup service
    /// expects plain percent-encoding (`%20`). Parameter order is part of
    /// the contract: name_startsWith, maxRows, username.
    fn search_url(&self, prefix: &str) -> String {
        format!(
            "{}/searchJSON?name_startsWith={}&maxRows={}&username={}",
            self.cfg.base_url.trim_end_matches('/'),
            utf8_percent_encode(prefix, QUERY_VALUE),
            self.cfg.max_rows,
            utf8_percent_encode(&self.cfg.username, QUERY_VALUE),
        )
    }

    /// Look up cities whose name starts with `prefix`. Fails on transport
    /// errors, non-success statuses, and malformed bodies alike; callers get
    /// no finer distinction than the error's message chain.
    pub async fn search(&self, prefix: &str) -> Result<SearchResponse> {
        let url = self.search_url(prefix);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("lookup request to {url} failed"))?
            .error_for_status()
            .context("lookup service returned an error status")?;
        resp.json::<SearchResponse>()
            .await
            .context("decode lookup response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{config, refused_base_url, serve};

    #[test]
    fn url_encodes_space_as_percent20() {
        let client = GeoNamesClient::new(config("http://api.geonames.org")).unwrap();
        assert_eq!(
            client.search_url("san francisco"),
            "http://api.geonames.org/searchJSON?name_startsWith=san%20francisco&maxRows=10&username=keep_truckin"
        );
    }

    #[test]
    fn url_escapes_structural_characters() {
        let client = GeoNamesClient::new(config("http://api.geonames.org")).unwrap();
        let url = client.search_url("a&b=c+d");
        assert!(url.contains("name_startsWith=a%26b%3Dc%2Bd&"));
    }

    #[test]
    fn url_tolerates_trailing_slash_in_base() {
        let client = GeoNamesClient::new(config("http://api.geonames.org/")).unwrap();
        assert!(client
            .search_url("oslo")
            .starts_with("http://api.geonames.org/searchJSON?"));
    }

    #[test]
    fn decode_full_record() {
        let body = r#"{
            "totalResultsCount": 2,
            "geonames": [
                {"name": "San Francisco", "adminName1": "California",
                 "countryName": "United States", "countryCode": "US",
                 "lat": "37.77493", "lng": "-122.41942", "population": 864816}
            ]
        }"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.total_results_count, 2);
        assert_eq!(resp.geonames.len(), 1);
        let rec = &resp.geonames[0];
        assert_eq!(rec.name, "San Francisco");
        assert_eq!(rec.admin_name1, "California");
        assert_eq!(rec.country_name, "United States");
        assert_eq!(rec.country_code, "US");
        assert_eq!(rec.lat, "37.77493");
        assert_eq!(rec.population, 864816);
    }

    #[test]
    fn decode_missing_fields_fall_back_to_defaults() {
        let resp: SearchResponse = serde_json::from_str(r#"{"geonames": [{"name": "Pago Pago"}]}"#).unwrap();
        assert_eq!(resp.total_results_count, 0);
        let rec = &resp.geonames[0];
        assert_eq!(rec.name, "Pago Pago");
        assert_eq!(rec.admin_name1, "");
        assert_eq!(rec.country_name, "");
        assert_eq!(rec.population, 0);
    }

    #[test]
    fn decode_missing_geonames_is_empty_list() {
        let resp: SearchResponse = serde_json::from_str(r#"{"totalResultsCount": 7}"#).unwrap();
        assert!(resp.geonames.is_empty());
        assert_eq!(resp.total_results_count, 7);
    }

    #[test]
    fn decode_empty_object() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.geonames.is_empty());
        assert_eq!(resp.total_results_count, 0);
    }

    #[tokio::test]
    async fn sends_expected_request_line() {
        let (base_url, handle) = serve(vec![(200, "{}".to_string())]).await;
        let client = GeoNamesClient::new(config(&base_url)).unwrap();
        let resp = client.search("san francisco").await.unwrap();
        assert!(resp.geonames.is_empty());
        assert_eq!(
            handle.await.unwrap(),
            vec!["GET /searchJSON?name_startsWith=san%20francisco&maxRows=10&username=keep_truckin HTTP/1.1"]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base_url, handle) = serve(vec![(503, "busy".to_string())]).await;
        let client = GeoNamesClient::new(config(&base_url)).unwrap();
        let err = client.search("oslo").await.unwrap_err();
        assert!(format!("{err:#}").contains("error status"));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let (base_url, handle) = serve(vec![(200, "<html>nope</html>".to_string())]).await;
        let client = GeoNamesClient::new(config(&base_url)).unwrap();
        let err = client.search("oslo").await.unwrap_err();
        assert!(format!("{err:#}").contains("decode lookup response"));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let client = GeoNamesClient::new(config(&refused_base_url().await)).unwrap();
        assert!(client.search("oslo").await.is_err());
    }
}
