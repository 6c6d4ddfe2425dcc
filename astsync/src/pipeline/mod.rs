//! Per-unit processing: load -> align -> verify -> report

mod error;
pub mod output;
mod result;
pub mod verify;

pub use error::PipelineError;
pub use output::{dump_tree_and_links, AlignmentReport, NodeLinks, TokenLinks};
pub use result::PipelineResult;
pub use verify::{verify_alignment, VerificationError};

use crate::alignment::align_unit_with;
use crate::config::runtime::AlignmentPreferences;
use crate::logging;
use crate::unit::AlignmentUnit;
use crate::{log_error, log_info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Load a unit file and align it with preferences from the environment
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    process_file_with_preferences(file_path, &AlignmentPreferences::default())
}

pub fn process_file_with_preferences(
    file_path: &str,
    preferences: &AlignmentPreferences,
) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        log_info!("Processing unit file", "file" => file_path);
        let start_time = Instant::now();

        let unit = AlignmentUnit::load(Path::new(file_path)).inspect_err(|e| {
            log_error!(e.error_code(), "Unit could not be loaded",
                "file" => file_path,
                "error" => e
            );
        })?;

        run(unit, preferences, start_time)
    })
}

/// Align an in-memory unit
pub fn process_unit(unit: AlignmentUnit) -> Result<PipelineResult, PipelineError> {
    process_unit_with_preferences(unit, &AlignmentPreferences::default())
}

pub fn process_unit_with_preferences(
    unit: AlignmentUnit,
    preferences: &AlignmentPreferences,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();
    logging::with_file_context(PathBuf::from(&unit.file), 0, || {
        run(unit, preferences, start_time)
    })
}

fn run(
    mut unit: AlignmentUnit,
    preferences: &AlignmentPreferences,
    start_time: Instant,
) -> Result<PipelineResult, PipelineError> {
    let summary = match align_unit_with(&mut unit, preferences) {
        Ok(summary) => summary,
        Err(error) => {
            match error.span() {
                Some(span) => log_error!(error.error_code(), &error.to_string(), span = span,
                    "file" => unit.file
                ),
                None => log_error!(error.error_code(), &error.to_string(),
                    "file" => unit.file
                ),
            }
            return Err(error.into());
        }
    };

    crate::log_success!(crate::logging::codes::success::ALIGNMENT_COMPLETE, "Alignment complete",
        "file" => unit.file,
        "claims" => summary.claim_log.len(),
        "max_depth" => summary.max_depth
    );

    if preferences.verify_after_alignment {
        if let Err(error) =
            verify_alignment(&unit.tokens, &unit.nodes, &summary.claim_log, &unit.file)
        {
            log_error!(error.error_code(), &error.to_string(), "file" => unit.file);
            return Err(error.into());
        }
        crate::log_success!(crate::logging::codes::success::VERIFICATION_PASSED,
            "Alignment invariants hold",
            "file" => unit.file
        );
    }

    let result = PipelineResult::new(
        unit,
        summary,
        preferences.verify_after_alignment,
        start_time.elapsed(),
    );
    result.log_success();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, TreeBuilder};
    use crate::tokens::TokenStreamBuilder;
    use assert_matches::assert_matches;
    use std::fs;

    fn pass_unit(source: &str) -> AlignmentUnit {
        let tokens = TokenStreamBuilder::from_source(source);
        let mut t = TreeBuilder::new();
        let pass = t.add_at(NodeKind::Pass, 1, 0);
        let module = t.module(vec![pass]);
        let nodes = t.finish(module).unwrap();
        AlignmentUnit::new("p.py", tokens, nodes, module).unwrap()
    }

    #[test]
    fn test_process_unit_verifies() {
        let _ = crate::logging::init_global_logging();
        let result = process_unit(pass_unit("pass  # ok\n")).unwrap();
        assert_eq!(result.summary.owned_claims, 1);

        let report = result.report(true);
        assert_eq!(report.nodes.len(), 1);
        assert_eq!(report.tokens.len(), 4);
        assert_eq!(report.tokens[1].kind, crate::tokens::TokenKind::Comment);
    }

    #[test]
    fn test_mismatch_surfaces_as_alignment_error() {
        let result = process_unit(pass_unit("break\n"));
        assert_matches!(result, Err(PipelineError::Alignment(_)));
        assert_eq!(
            result.unwrap_err().error_code(),
            crate::logging::codes::alignment::GRAMMAR_MISMATCH
        );
    }

    #[test]
    fn test_process_file_round_trip() {
        let unit = pass_unit("pass\n");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(&path, serde_json::to_string(&unit).unwrap()).unwrap();

        let result = process_file(path.to_str().unwrap()).unwrap();
        assert_eq!(result.unit.file, "p.py");
        assert!(result.report(false).to_json().unwrap().contains("\"generated_at\""));
    }

    #[test]
    fn test_process_missing_file() {
        assert_matches!(
            process_file("/nonexistent/unit.json"),
            Err(PipelineError::Unit(_))
        );
    }
}
