use super::output::AlignmentReport;
use crate::alignment::AlignmentSummary;
use crate::logging::codes;
use crate::unit::AlignmentUnit;
use std::time::Duration;

/// An aligned unit with what the traversal reported
#[derive(Debug)]
pub struct PipelineResult {
    pub unit: AlignmentUnit,
    pub summary: AlignmentSummary,
    /// Whether the post-traversal checks ran (they passed if the result exists)
    pub verified: bool,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        unit: AlignmentUnit,
        summary: AlignmentSummary,
        verified: bool,
        processing_duration: Duration,
    ) -> Self {
        Self {
            unit,
            summary,
            verified,
            processing_duration,
        }
    }

    pub fn report(&self, include_tokens: bool) -> AlignmentReport {
        AlignmentReport::new(&self.unit, &self.summary, self.verified, include_tokens)
    }

    pub fn log_success(&self) {
        let seconds = self.processing_duration.as_secs_f64();
        crate::log_success!(
            codes::success::UNIT_PROCESSING_COMPLETE,
            "Unit aligned",
            "file" => self.unit.file,
            "tokens" => self.unit.token_count(),
            "owned" => self.summary.owned_claims,
            "comments" => self.summary.comments_attached,
            "verified" => self.verified,
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "tokens_per_sec" => format!("{:.0}", self.unit.token_count() as f64 / seconds.max(f64::EPSILON))
        );
    }
}
