// Roadmap result types and the timeline renderer.
// The roadmap itself is produced by the backend; this module only shapes it for display.

pub mod performance;
pub mod render;

use serde::{Deserialize, Deserializer};

pub use performance::{PerformanceMetrics, PerformanceSummary, ProbeResult};
pub use render::{render, CourseBlock, RenderItem, RenderKind, RenderedRoadmap};

/// Title the backend uses when it has no course to recommend.
pub const NO_RECOMMENDATION: &str = "N/A";

/// Link the backend substitutes when a course has no URL.
const NO_LINK: &str = "#";

const NO_RESOURCES: &str = "No resources provided.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseRecommendation {
    #[serde(default = "no_recommendation", deserialize_with = "title_or_placeholder")]
    pub title: String,
    #[serde(default = "no_link", deserialize_with = "url_or_placeholder")]
    pub url: String,
    #[serde(default = "no_recommendation", deserialize_with = "title_or_placeholder")]
    pub platform: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

impl CourseRecommendation {
    pub fn is_placeholder(&self) -> bool {
        self.title == NO_RECOMMENDATION
    }
}

fn no_recommendation() -> String {
    NO_RECOMMENDATION.to_string()
}

fn no_link() -> String {
    NO_LINK.to_string()
}

/// Treats an explicit `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn title_or_placeholder<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(no_recommendation))
}

fn url_or_placeholder<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(no_link))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadmapSkillEntry {
    pub skill: String,
    #[serde(default)]
    pub course: Option<CourseRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadmapPhase {
    #[serde(rename = "phase")]
    pub title: String,
    #[serde(default, alias = "items", deserialize_with = "null_as_default")]
    pub skills: Vec<RoadmapSkillEntry>,
}

/// A successful `/generate-roadmap` exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadmapResult {
    /// A `null` or missing roadmap is the empty state, not a malformed reply.
    #[serde(rename = "roadmap", default, deserialize_with = "null_as_default")]
    pub phases: Vec<RoadmapPhase>,
    #[serde(default)]
    pub resources: Option<String>,
    #[serde(default)]
    pub performance: Option<PerformanceMetrics>,
}

impl RoadmapResult {
    pub fn resources_text(&self) -> &str {
        match self.resources.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => NO_RESOURCES,
        }
    }
}
