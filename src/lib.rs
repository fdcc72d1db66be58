//! Core of the CP Mentor web client: payload types, the per-user session cache,
//! the fetch/cache/render controller, the API transport and the printable sheet export.
//!
//! Everything except the transport and the print window is plain Rust so it can be
//! exercised with `cargo test` outside the browser.

use serde::{Deserialize, Deserializer, Serialize};

pub mod api;
pub mod cache;
pub mod controller;
pub mod export;

/// Default request parameters
pub mod defaults {
    /// Prefix for every API path. Empty means same origin.
    pub const API_BASE: &str = "";
    pub const REQUEST_TIMEOUT_MS: u32 = 20_000;
    /// Problems requested per weak topic.
    pub const PER_TOPIC: u32 = 5;
}

/// Something fetched for one Codeforces handle.
pub trait Keyed {
    /// The handle embedded in the payload, if the server sent a non-blank one.
    fn owner_id(&self) -> Option<&str>;
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub codeforces_id: Option<String>,
}

impl AuthenticatedUser {
    /// Linked Codeforces handle, ignoring blank values.
    pub fn handle(&self) -> Option<&str> {
        non_blank(&self.codeforces_id)
    }
}

/// Body returned by `/api/signup` and `/api/login`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopicAccuracy {
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verdict: String,
    /// Colour hint for the verdict badge: "green", "red" or "yellow".
    #[serde(default, deserialize_with = "null_as_default")]
    pub tone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default)]
    pub view_url: Option<String>,
}

/// Rating stats and recent activity for one handle, as served by `/api/dashboard`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSnapshot {
    pub codeforces_id: Option<String>,
    pub username: Option<String>,
    pub rank: Option<String>,
    #[serde(deserialize_with = "whole_number")]
    pub current_rating: Option<i64>,
    #[serde(deserialize_with = "whole_number")]
    pub max_rating: Option<i64>,
    pub max_rank: Option<String>,
    #[serde(deserialize_with = "whole_number")]
    pub rating_delta: Option<i64>,
    #[serde(deserialize_with = "whole_number")]
    pub friend_of_count: Option<i64>,
    #[serde(deserialize_with = "whole_number")]
    pub contribution: Option<i64>,
    #[serde(deserialize_with = "whole_number")]
    pub problems_solved: Option<i64>,
    /// Unix seconds; fractional timestamps are truncated.
    #[serde(deserialize_with = "whole_number")]
    pub last_synced: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub topic_accuracy: Vec<TopicAccuracy>,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_submissions: Vec<Submission>,
}

impl Keyed for DashboardSnapshot {
    fn owner_id(&self) -> Option<&str> {
        non_blank(&self.codeforces_id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedProblem {
    #[serde(deserialize_with = "null_as_default")]
    pub problem_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub problem_name: String,
    pub problem_rating: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub cf_link: String,
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicRecommendation {
    #[serde(deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(deserialize_with = "null_as_default")]
    pub weakness_score: f64,
    #[serde(deserialize_with = "count")]
    pub solved_unique: u32,
    #[serde(deserialize_with = "count")]
    pub attempted_unique: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub problems: Vec<RecommendedProblem>,
}

/// Weak-topic practice sheet, as served by `/api/recommendations/weak-topics`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationSheet {
    pub codeforces_id: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub cluster: Option<String>,
    #[serde(deserialize_with = "whole_count")]
    pub top_weak_topics_count: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<TopicRecommendation>,
}

impl RecommendationSheet {
    pub fn total_problems(&self) -> usize {
        self.recommendations.iter().map(|t| t.problems.len()).sum()
    }
}

impl Keyed for RecommendationSheet {
    fn owner_id(&self) -> Option<&str> {
        non_blank(&self.codeforces_id)
    }
}

/// The cluster label comes back as either an integer id or a name.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer stat sent as an int, a float or a numeric string. Anything else is absent.
fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    })
}

fn whole_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(whole_number(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(whole_count(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_tolerates_missing_fields() {
        let snap: DashboardSnapshot =
            serde_json::from_str(r#"{"codeforces_id":"tourist","current_rating":3800}"#).unwrap();
        assert_eq!(snap.owner_id(), Some("tourist"));
        assert_eq!(snap.current_rating, Some(3800));
        assert!(snap.topic_accuracy.is_empty());
        assert_eq!(snap.last_synced, None);
    }

    #[test]
    fn blank_handle_is_not_an_owner() {
        let snap = DashboardSnapshot {
            codeforces_id: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(snap.owner_id(), None);

        let user = AuthenticatedUser {
            codeforces_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(user.handle(), None);
    }

    #[test]
    fn sheet_cluster_accepts_numbers_and_strings() {
        let numeric: RecommendationSheet =
            serde_json::from_str(r#"{"codeforces_id":"a","cluster":3}"#).unwrap();
        assert_eq!(numeric.cluster.as_deref(), Some("3"));

        let named: RecommendationSheet =
            serde_json::from_str(r#"{"cluster":"graphs-heavy"}"#).unwrap();
        assert_eq!(named.cluster.as_deref(), Some("graphs-heavy"));

        let null: RecommendationSheet = serde_json::from_str(r#"{"cluster":null}"#).unwrap();
        assert_eq!(null.cluster, None);
    }

    #[test]
    fn total_problems_counts_every_topic() {
        let sheet: RecommendationSheet = serde_json::from_str(
            r#"{"recommendations":[
                {"topic":"dp","problems":[{"problem_key":"1A"},{"problem_key":"2B"}]},
                {"topic":"graphs","problems":[{"problem_key":"3C"}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(sheet.total_problems(), 3);
    }

    #[test]
    fn auth_response_user_may_be_absent() {
        let resp: AuthResponse = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert!(resp.user.is_none());

        let resp: AuthResponse = serde_json::from_str(
            r#"{"user":{"id":"1","username":"neo","email":"n@x.io","codeforces_id":"neo_cf"}}"#,
        )
        .unwrap();
        assert_eq!(resp.user.unwrap().handle(), Some("neo_cf"));
    }

    #[test]
    fn dashboard_accepts_float_and_null_stats() {
        let snap: DashboardSnapshot = serde_json::from_str(
            r#"{"codeforces_id":"tourist","last_synced":1712345678.52,"current_rating":3800.0,
                "max_rating":"3979","contribution":null,"topic_accuracy":null,
                "recent_submissions":[{"name":null,"verdict":"Accepted","time":"2h ago"}]}"#,
        )
        .unwrap();
        assert_eq!(snap.last_synced, Some(1712345678));
        assert_eq!(snap.current_rating, Some(3800));
        assert_eq!(snap.max_rating, Some(3979));
        assert_eq!(snap.contribution, None);
        assert!(snap.topic_accuracy.is_empty());
        assert_eq!(snap.recent_submissions[0].name, "");
        assert_eq!(snap.recent_submissions[0].verdict, "Accepted");
    }

    #[test]
    fn accuracy_row_without_topic_keeps_snapshot() {
        let snap: DashboardSnapshot = serde_json::from_str(
            r#"{"topic_accuracy":[{"value":40},{"topic":"dp","value":85}]}"#,
        )
        .unwrap();
        assert_eq!(snap.topic_accuracy.len(), 2);
        assert_eq!(snap.topic_accuracy[0].topic, "");
        assert_eq!(snap.topic_accuracy[1].value, 85.0);
    }

    #[test]
    fn sheet_tolerates_null_links_and_float_counts() {
        let sheet: RecommendationSheet = serde_json::from_str(
            r#"{"codeforces_id":"a","top_weak_topics_count":3.0,"recommendations":[
                {"topic":"dp","weakness_score":null,"solved_unique":2.0,"attempted_unique":5,
                 "problems":[{"problem_key":"1A","problem_name":"Theatre Square","cf_link":null}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(sheet.top_weak_topics_count, Some(3));
        let topic = &sheet.recommendations[0];
        assert_eq!(topic.weakness_score, 0.0);
        assert_eq!((topic.solved_unique, topic.attempted_unique), (2, 5));
        assert_eq!(topic.problems[0].cf_link, "");
        assert_eq!(topic.problems[0].problem_name, "Theatre Square");
    }
}
