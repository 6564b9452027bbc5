pub mod api;
pub mod error;
pub mod throttle;

use crate::core::config::StackExchangeConfig;
use crate::query_rewriter::{QueryRewriter, TOP_QUESTION_TAGS};
use crate::scraping::clean::clean_html;
use crate::types::{Answer, ApiQuota, Question, QuotaValue};
use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

pub use api::{ApiWrapper, RawAnswer, RawQuestion, StackExchangeClient, FILTER_WITH_BODY};
pub use error::StackOverflowError;
pub use throttle::Throttle;

/// Answers attached to each question in a free-text search.
const SEARCH_ANSWERS_PER_QUESTION: usize = 2;
/// Questions returned by a tagged search.
const TAGGED_QUESTION_LIMIT: usize = 5;
/// Answers attached to each question in a tagged search.
const TAGGED_ANSWERS_PER_QUESTION: usize = 1;
const DEFAULT_LIMIT: usize = 5;

/// Actions accepted under `params.action`.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `limit` is `None` when the caller sent one that is not a non-negative integer.
    Search { query: String, limit: Option<usize> },
    GetAnswers { question_id: Option<u64> },
    SearchWithTags { tags: Vec<String>, query: Option<String> },
}

impl Action {
    pub fn from_params(params: &Value) -> Result<Self, StackOverflowError> {
        let action = params.get("action").and_then(|v| v.as_str());

        match action {
            Some("search") => Ok(Action::Search {
                query: params
                    .get("query")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                limit: match params.get("limit") {
                    None => Some(DEFAULT_LIMIT),
                    Some(v) => v.as_u64().map(|n| n as usize),
                },
            }),
            Some("get_answers") => Ok(Action::GetAnswers {
                question_id: params.get("question_id").and_then(question_id_from_value),
            }),
            Some("search_with_tags") => Ok(Action::SearchWithTags {
                tags: params
                    .get("tags")
                    .and_then(|v| v.as_array())
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|t| t.as_str().map(|s| s.to_string()))
                            .collect()
                    })
                    .unwrap_or_default(),
                query: params
                    .get("query")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
            }),
            other => Err(StackOverflowError::UnknownAction(
                other.map(str::to_string).unwrap_or_else(|| {
                    params
                        .get("action")
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "None".to_string())
                }),
            )),
        }
    }
}

/// Accepts `123` or `"123"`; anything else counts as absent.
fn question_id_from_value(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Stack Overflow search service biased toward OpenShift / Kubernetes content.
///
/// Search-family methods never fail: remote errors are logged and turn into
/// an empty list.
#[derive(Debug)]
pub struct StackOverflowService {
    client: StackExchangeClient,
}

impl StackOverflowService {
    pub fn new(http: reqwest::Client, config: &StackExchangeConfig) -> Self {
        Self {
            client: StackExchangeClient::new(http, config),
        }
    }

    pub fn client(&self) -> &StackExchangeClient {
        &self.client
    }

    /// Entry point for the router: dispatch on `params.action`.
    pub async fn handle(&self, params: &Value) -> Result<Value> {
        let action = Action::from_params(params)?;
        info!("stackoverflow action: {:?}", action);

        let value = match action {
            Action::Search {
                query,
                limit: Some(limit),
            } => serde_json::to_value(self.search_questions(&query, limit).await)?,
            Action::Search { limit: None, .. } => {
                warn!("Error searching questions: limit must be a non-negative integer");
                Value::Array(Vec::new())
            }
            Action::GetAnswers { question_id } => serde_json::to_value(
                self.get_answers_for_question(question_id, DEFAULT_LIMIT)
                    .await,
            )?,
            Action::SearchWithTags { tags, query } => {
                serde_json::to_value(self.search_with_tags(&tags, query.as_deref()).await)?
            }
        };
        Ok(value)
    }

    pub async fn search_questions(&self, query: &str, limit: usize) -> Vec<Question> {
        match self.try_search_questions(query, limit).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Error searching questions: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search_questions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Question>, StackOverflowError> {
        let enhanced = QueryRewriter::enhance_query(query);
        let page: ApiWrapper<RawQuestion> = self
            .client
            .fetch(
                "search/advanced",
                &[
                    ("q", enhanced),
                    ("order", "desc".to_string()),
                    ("sort", "relevance".to_string()),
                    ("pagesize", limit.min(10).to_string()),
                    ("filter", FILTER_WITH_BODY.to_string()),
                ],
            )
            .await?;

        let mut results = Vec::new();
        for item in page.into_items().into_iter().take(limit) {
            let mut question = project_question(item);
            question.answers = self
                .get_answers_for_question(question.question_id, SEARCH_ANSWERS_PER_QUESTION)
                .await;
            results.push(question);
        }
        Ok(results)
    }

    pub async fn get_answers_for_question(
        &self,
        question_id: Option<u64>,
        limit: usize,
    ) -> Vec<Answer> {
        let Some(question_id) = question_id.filter(|id| *id != 0) else {
            return Vec::new();
        };

        match self.try_get_answers(question_id, limit).await {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    "Error fetching answers for question {}: {}",
                    question_id, e
                );
                Vec::new()
            }
        }
    }

    async fn try_get_answers(
        &self,
        question_id: u64,
        limit: usize,
    ) -> Result<Vec<Answer>, StackOverflowError> {
        let page: ApiWrapper<RawAnswer> = self
            .client
            .fetch(
                &format!("questions/{}/answers", question_id),
                &[
                    ("order", "desc".to_string()),
                    ("sort", "votes".to_string()),
                    ("pagesize", limit.min(10).to_string()),
                    ("filter", FILTER_WITH_BODY.to_string()),
                ],
            )
            .await?;

        Ok(page
            .into_items()
            .into_iter()
            .take(limit)
            .map(project_answer)
            .collect())
    }

    pub async fn search_with_tags(&self, tags: &[String], query: Option<&str>) -> Vec<Question> {
        match self.try_search_with_tags(tags, query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Error searching with tags: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search_with_tags(
        &self,
        tags: &[String],
        query: Option<&str>,
    ) -> Result<Vec<Question>, StackOverflowError> {
        let enhanced_tags = QueryRewriter::enhance_tags(tags);

        let mut params = vec![
            ("tagged", QueryRewriter::tag_filter(&enhanced_tags)),
            ("order", "desc".to_string()),
            ("sort", "votes".to_string()),
            ("pagesize", "10".to_string()),
            ("filter", FILTER_WITH_BODY.to_string()),
        ];
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("q", QueryRewriter::enhance_query(q)));
        }

        let page: ApiWrapper<RawQuestion> = self.client.fetch("questions", &params).await?;

        let mut results = Vec::new();
        for item in page.into_items().into_iter().take(TAGGED_QUESTION_LIMIT) {
            let mut question = project_question(item);
            question.answers = self
                .get_answers_for_question(question.question_id, TAGGED_ANSWERS_PER_QUESTION)
                .await;
            results.push(question);
        }
        Ok(results)
    }

    /// Highest-voted questions across the core ecosystem tags.
    pub async fn get_top_openshift_questions(&self) -> Vec<Question> {
        let tags: Vec<String> = TOP_QUESTION_TAGS.iter().map(|t| t.to_string()).collect();
        self.search_with_tags(&tags, None).await
    }

    /// True when the `info` endpoint answers with an `items` payload.
    pub async fn test_connection(&self) -> bool {
        match self.client.fetch::<Value>("info", &[]).await {
            Ok(info) => info.items.is_some(),
            Err(e) => {
                warn!("Stack Exchange connection test failed: {}", e);
                false
            }
        }
    }

    pub async fn get_api_quota(&self) -> ApiQuota {
        match self.client.fetch::<Value>("info", &[]).await {
            Ok(info) => match info.quota_remaining {
                Some(remaining) => ApiQuota {
                    quota_remaining: QuotaValue::Count(remaining),
                    quota_max: info
                        .quota_max
                        .map(QuotaValue::Count)
                        .unwrap_or_else(QuotaValue::unknown),
                    has_more: info.has_more,
                },
                None => ApiQuota::unknown(),
            },
            Err(e) => {
                warn!("Stack Exchange quota lookup failed: {}", e);
                ApiQuota::unknown()
            }
        }
    }
}

fn project_question(item: RawQuestion) -> Question {
    Question {
        question_id: item.question_id,
        title: item.title.unwrap_or_default(),
        score: item.score.unwrap_or(0),
        answer_count: item.answer_count.unwrap_or(0),
        tags: item.tags.unwrap_or_default(),
        creation_date: item.creation_date,
        last_activity_date: item.last_activity_date,
        is_answered: item.is_answered.unwrap_or(false),
        accepted_answer_id: item.accepted_answer_id,
        link: item.link.unwrap_or_default(),
        body: clean_html(item.body.as_deref().unwrap_or_default()),
        answers: Vec::new(),
    }
}

fn project_answer(item: RawAnswer) -> Answer {
    Answer {
        answer_id: item.answer_id,
        score: item.score.unwrap_or(0),
        is_accepted: item.is_accepted.unwrap_or(false),
        creation_date: item.creation_date,
        body: clean_html(item.body.as_deref().unwrap_or_default()),
    }
}
