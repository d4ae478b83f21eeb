use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Course {
    pub title: String,
    pub provider: String,
    pub duration: String,
    pub level: String,
    pub topics: Vec<String>,
}

/// One milestone of a learning roadmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoadmapNode {
    pub title: String,
    pub description: String,
    pub time_estimate: String,
    pub difficulty: String,
    pub skills: Vec<String>,
    pub courses: Vec<Course>,
    pub projects: Vec<String>,
}

/// A model-produced roadmap that passed validation but is not stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapDraft {
    pub title: String,
    pub description: String,
    pub time_estimate: String,
    pub nodes: Vec<RoadmapNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub career_goal: String,
    pub experience_level: String,
    pub time_estimate: String,
    pub nodes: Vec<RoadmapNode>,
    pub created_at: DateTime<Utc>,
}
