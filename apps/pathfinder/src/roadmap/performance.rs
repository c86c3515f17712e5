use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::roadmap::null_as_default;

/// Optional timing block the backend attaches to generation and probe responses.
/// Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default)]
    pub generation_time: Option<f64>,
    #[serde(default)]
    pub cache_hit_ratio: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step_timings: HashMap<String, f64>,
}

/// What the results panel shows: backend figures, with the client-measured
/// round trip standing in when the backend did not report a generation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub generation_secs: f64,
    pub cache_hit_percent: f64,
    pub llm_secs: Option<f64>,
}

impl PerformanceSummary {
    pub fn new(metrics: &PerformanceMetrics, measured: Duration) -> Self {
        Self {
            generation_secs: metrics
                .generation_time
                .unwrap_or_else(|| measured.as_secs_f64()),
            cache_hit_percent: metrics.cache_hit_ratio.unwrap_or(0.0) * 100.0,
            llm_secs: metrics.step_timings.get("llm_call").copied(),
        }
    }
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generation time: {:.2}s | Cache hit ratio: {:.1}%",
            self.generation_secs, self.cache_hit_percent
        )?;
        if let Some(llm) = self.llm_secs {
            write!(f, " | LLM time: {llm:.2}s")?;
        }
        Ok(())
    }
}

/// Result of `/performance-test`: one uncached run followed by a cached one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbeResult {
    #[serde(rename = "optimized_time")]
    pub first_run_seconds: f64,
    #[serde(rename = "cached_time")]
    pub cached_run_seconds: f64,
    #[serde(rename = "cache_speedup")]
    pub speedup_factor: f64,
    #[serde(rename = "performance_summary", default)]
    pub summary: Option<PerformanceMetrics>,
}

impl ProbeResult {
    pub fn headline(&self) -> String {
        format!(
            "Performance Test Results: first run {}s, cached run {}s, cache speedup {}x",
            self.first_run_seconds, self.cached_run_seconds, self.speedup_factor
        )
    }

    pub fn summary(&self) -> Option<PerformanceSummary> {
        let measured = Duration::try_from_secs_f64(self.first_run_seconds).unwrap_or_default();
        self.summary
            .as_ref()
            .map(|metrics| PerformanceSummary::new(metrics, measured))
    }
}
