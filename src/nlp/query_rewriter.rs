//! Bias free-text queries and tag sets toward the OpenShift / Kubernetes ecosystem.
//!
//! This is a heuristic nudge for the upstream search, not a parser: terms are
//! matched as plain lowercase substrings, so `"spodcast"` counts as mentioning
//! `pod` and that is accepted.

/// Terms that already pin a query to the target ecosystem.
pub const DOMAIN_TERMS: [&str; 5] = ["openshift", "kubernetes", "k8s", "redhat", "ocp"];

/// Infrastructure nouns that warrant both ecosystem terms.
pub const INFRA_TERMS: [&str; 5] = ["pod", "deployment", "service", "route", "ingress"];

/// Tags every tagged search must carry, appended in this order.
pub const CORE_TAGS: [&str; 2] = ["openshift", "kubernetes"];

/// Seed tags for the "top OpenShift questions" listing.
pub const TOP_QUESTION_TAGS: [&str; 4] = ["openshift", "kubernetes", "k8s", "redhat"];

pub struct QueryRewriter;

impl QueryRewriter {
    pub fn mentions_domain(query: &str) -> bool {
        let lower = query.to_lowercase();
        DOMAIN_TERMS.iter().any(|t| lower.contains(t))
    }

    pub fn mentions_infra(query: &str) -> bool {
        let lower = query.to_lowercase();
        INFRA_TERMS.iter().any(|t| lower.contains(t))
    }

    /// Append ecosystem terms unless the query already names one.
    pub fn enhance_query(query: &str) -> String {
        if Self::mentions_domain(query) {
            return query.to_string();
        }
        if Self::mentions_infra(query) {
            return format!("{} openshift kubernetes", query);
        }
        format!("{} openshift", query)
    }

    /// Append the core tags that are missing (exact match), keeping caller order.
    pub fn enhance_tags(tags: &[String]) -> Vec<String> {
        let mut out = tags.to_vec();
        for tag in CORE_TAGS {
            if !out.iter().any(|t| t == tag) {
                out.push(tag.to_string());
            }
        }
        out
    }

    /// `tagged=` filter value: tags joined with `;`.
    pub fn tag_filter(tags: &[String]) -> String {
        tags.join(";")
    }
}
