use super::error::StackOverflowError;
use super::throttle::Throttle;
use crate::core::config::StackExchangeConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Filter that makes the API include `body` on questions and answers.
pub const FILTER_WITH_BODY: &str = "withbody";

/// Common response wrapper returned by every Stack Exchange endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiWrapper<T> {
    pub items: Option<Vec<T>>,
    #[serde(default)]
    pub has_more: bool,
    pub quota_max: Option<u64>,
    pub quota_remaining: Option<u64>,
    pub backoff: Option<u64>,
    pub error_id: Option<u64>,
    pub error_name: Option<String>,
    pub error_message: Option<String>,
}

impl<T> ApiWrapper<T> {
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

/// Raw question item (`filter=withbody`). Every field is optional on the wire.
#[derive(Debug, Deserialize, Default)]
pub struct RawQuestion {
    pub question_id: Option<u64>,
    pub title: Option<String>,
    pub score: Option<i64>,
    pub answer_count: Option<u64>,
    pub tags: Option<Vec<String>>,
    pub creation_date: Option<i64>,
    pub last_activity_date: Option<i64>,
    pub is_answered: Option<bool>,
    pub accepted_answer_id: Option<u64>,
    pub link: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawAnswer {
    pub answer_id: Option<u64>,
    pub score: Option<i64>,
    pub is_accepted: Option<bool>,
    pub creation_date: Option<i64>,
    pub body: Option<String>,
}

/// Thin GET client over the Stack Exchange REST API.
///
/// Every request is single-page (`page=1`), scoped to one site, and gated
/// by the [`Throttle`].
#[derive(Debug)]
pub struct StackExchangeClient {
    http: reqwest::Client,
    base_url: String,
    site: String,
    page_size: usize,
    throttle: Throttle,
}

impl StackExchangeClient {
    pub fn new(http: reqwest::Client, config: &StackExchangeConfig) -> Self {
        Self {
            http,
            base_url: config.resolve_base_url(),
            site: config.resolve_site(),
            page_size: config.resolve_page_size(),
            throttle: Throttle::new(config.resolve_min_delay()),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    fn endpoint_url(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Url, StackOverflowError> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/{}",
            self.base_url,
            endpoint.trim_start_matches('/')
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("site", &self.site);
            pairs.append_pair("page", "1");
            for (k, v) in params {
                if *k == "pagesize" {
                    let size = v
                        .parse::<usize>()
                        .map(|n| n.min(self.page_size))
                        .unwrap_or(self.page_size);
                    pairs.append_pair(k, &size.to_string());
                } else {
                    pairs.append_pair(k, v);
                }
            }
        }
        Ok(url)
    }

    /// Issue one throttled GET against `endpoint` and decode the wrapper.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<ApiWrapper<T>, StackOverflowError> {
        let url = self.endpoint_url(endpoint, params)?;
        let http_err = |source| StackOverflowError::Http {
            endpoint: endpoint.to_string(),
            source,
        };

        self.throttle.acquire().await;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(http_err)?;
        let status = resp.status();

        let wrapper: ApiWrapper<T> = if status.is_success() {
            resp.json().await.map_err(http_err)?
        } else {
            // Error bodies still follow the wrapper shape; anything else is reported by status.
            let body = resp.text().await.unwrap_or_default();
            match serde_json::from_str::<ApiWrapper<T>>(&body) {
                Ok(w) if w.error_id.is_some() => w,
                _ => {
                    return Err(StackOverflowError::Status {
                        endpoint: endpoint.to_string(),
                        status,
                    })
                }
            }
        };

        if let Some(secs) = wrapper.backoff {
            warn!("API requested backoff of {}s after '{}'", secs, endpoint);
            self.throttle.backoff(secs).await;
        }

        if let Some(error_id) = wrapper.error_id {
            return Err(StackOverflowError::Api {
                endpoint: endpoint.to_string(),
                error_id,
                error_name: wrapper.error_name.unwrap_or_default(),
                error_message: wrapper.error_message.unwrap_or_default(),
            });
        }

        Ok(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StackExchangeClient {
        let cfg = StackExchangeConfig {
            base_url: Some("https://api.example.test/2.3/".to_string()),
            site: Some("stackoverflow".to_string()),
            min_delay_ms: Some(0),
            page_size: None,
        };
        StackExchangeClient::new(reqwest::Client::new(), &cfg)
    }

    #[test]
    fn endpoint_url_carries_site_page_and_params() {
        let url = client()
            .endpoint_url(
                "search/advanced",
                &[("q", "pod crash openshift".to_string()), ("sort", "relevance".to_string())],
            )
            .unwrap();
        assert_eq!(url.path(), "/2.3/search/advanced");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("site".into(), "stackoverflow".into())));
        assert!(pairs.contains(&("page".into(), "1".into())));
        assert!(pairs.contains(&("q".into(), "pod crash openshift".into())));
    }

    #[test]
    fn pagesize_is_capped_at_client_page_size() {
        let url = client()
            .endpoint_url("questions", &[("pagesize", "50".to_string())])
            .unwrap();
        let size = url
            .query_pairs()
            .find(|(k, _)| k == "pagesize")
            .map(|(_, v)| v.into_owned());
        assert_eq!(size.as_deref(), Some("10"));
    }

    #[test]
    fn error_wrapper_decodes_without_items() {
        let w: ApiWrapper<RawQuestion> = serde_json::from_str(
            r#"{"error_id": 502, "error_name": "throttle_violation", "error_message": "too many requests"}"#,
        )
        .unwrap();
        assert!(w.items.is_none());
        assert_eq!(w.error_id, Some(502));
    }

    #[derive(Debug, Deserialize)]
    struct Tag {
        name: String,
    }

    #[test]
    fn wrapper_decodes_item_types_without_default() {
        let w: ApiWrapper<Tag> =
            serde_json::from_str(r#"{"items": [{"name": "openshift"}], "quota_remaining": 12}"#)
                .unwrap();
        assert!(!w.has_more);
        assert_eq!(w.quota_remaining, Some(12));
        assert!(w.backoff.is_none());
        assert_eq!(w.into_items()[0].name, "openshift");
    }
}
