//! Static content shown before real data arrives, and for the views that have no
//! backend yet (mock contest, upcoming contests).

use cp_mentor::{Submission, TopicAccuracy};
use log::error;
use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContestProblem {
    pub title: String,
    pub difficulty: String,
    pub topic: String,
    pub status: String,
    pub points: u32,
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MockContest {
    pub time_remaining: String,
    pub problems: Vec<ContestProblem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpcomingContest {
    pub platform: String,
    pub tag: String,
    pub title: String,
    pub starts_in: String,
    pub date: String,
    pub duration: String,
    pub action: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Placeholder {
    pub topic_accuracy: Vec<TopicAccuracy>,
    pub recent_submissions: Vec<Submission>,
    pub contest: MockContest,
    pub upcoming: Vec<UpcomingContest>,
}

pub static PLACEHOLDER: Lazy<Placeholder> = Lazy::new(|| {
    serde_json::from_str(include_str!("placeholder.json")).unwrap_or_else(|e| {
        error!("placeholder data is malformed: {}", e);
        Placeholder::default()
    })
});
