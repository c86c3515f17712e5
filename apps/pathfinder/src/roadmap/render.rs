//! Roadmap Renderer — flattens phases into an ordered, staggered timeline.
//!
//! Pure and deterministic: rendering the same phases twice yields identical output,
//! so a host can redraw from scratch on every response.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::roadmap::{CourseRecommendation, RoadmapPhase};

pub const EMPTY_ROADMAP_PLACEHOLDER: &str = "No learning path could be generated. \
    You may already possess all the required skills for this role!";

/// Default spacing between consecutive reveals.
pub const DEFAULT_REVEAL_STEP: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseBlock {
    pub title: String,
    pub url: String,
    pub platform: String,
    pub reason: String,
}

impl CourseBlock {
    /// `None` for the "N/A" placeholder, which must not render as a dead link.
    fn from_recommendation(course: &CourseRecommendation) -> Option<Self> {
        if course.is_placeholder() {
            return None;
        }
        Some(CourseBlock {
            title: course.title.clone(),
            url: course.url.clone(),
            platform: course.platform.clone(),
            reason: course.reason.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderKind {
    PhaseHeader {
        title: String,
    },
    SkillEntry {
        skill: String,
        course: Option<CourseBlock>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub index: usize,
    #[serde(serialize_with = "as_millis")]
    pub reveal_delay: Duration,
    #[serde(flatten)]
    pub kind: RenderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderedRoadmap {
    /// Not an error: the backend found nothing left to learn.
    Empty { placeholder: &'static str },
    Timeline { items: Vec<RenderItem> },
}

impl RenderedRoadmap {
    pub fn is_empty(&self) -> bool {
        matches!(self, RenderedRoadmap::Empty { .. })
    }

    pub fn items(&self) -> &[RenderItem] {
        match self {
            RenderedRoadmap::Empty { .. } => &[],
            RenderedRoadmap::Timeline { items } => items,
        }
    }
}

/// Flattens `phases` into header and skill items, numbering them in display
/// order and spacing their reveal by `step`.
pub fn render(phases: &[RoadmapPhase], step: Duration) -> RenderedRoadmap {
    if phases.is_empty() {
        return RenderedRoadmap::Empty {
            placeholder: EMPTY_ROADMAP_PLACEHOLDER,
        };
    }

    let mut items = Vec::new();
    let mut push = |kind: RenderKind| {
        let index = items.len();
        items.push(RenderItem {
            index,
            reveal_delay: step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX)),
            kind,
        });
    };

    for phase in phases {
        push(RenderKind::PhaseHeader {
            title: phase.title.clone(),
        });
        for entry in &phase.skills {
            push(RenderKind::SkillEntry {
                skill: entry.skill.clone(),
                course: entry.course.as_ref().and_then(CourseBlock::from_recommendation),
            });
        }
    }

    RenderedRoadmap::Timeline { items }
}

impl fmt::Display for RenderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RenderKind::PhaseHeader { title } => write!(f, "== {title} =="),
            RenderKind::SkillEntry { skill, course } => {
                write!(f, "  * {skill}")?;
                if let Some(course) = course {
                    write!(
                        f,
                        "\n      Recommended Course: {} <{}>\n      Platform: {}\n      Reason: {}",
                        course.title, course.url, course.platform, course.reason
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for RenderedRoadmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedRoadmap::Empty { placeholder } => f.write_str(placeholder),
            RenderedRoadmap::Timeline { items } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
