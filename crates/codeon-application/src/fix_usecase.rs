//! Fix proposal workflow.
//!
//! `FixUsecase` turns an issue description into an applicable plan: load
//! the codebase, request a structured fix proposal, parse it, and pair
//! each proposed change with a diff against the loaded content.

use codeon_core::clients::GenerationClient;
use codeon_core::codebase::Codebase;
use codeon_core::error::{CodeonError, Result};
use codeon_core::fix::{
    DiffLine, FileChange, FixProposal, build_fix_prompt, diff_lines, fix_options,
    parse_fix_proposal,
};
use codeon_infrastructure::CodebaseLoader;
use std::path::Path;
use std::sync::Arc;

/// One proposed file change paired with its display diff.
#[derive(Debug, Clone)]
pub struct PlannedChange {
    /// The proposed change as returned by the model.
    pub change: FileChange,
    /// Line diff against the loaded content, or `None` when the file was
    /// not part of the scanned codebase.
    pub diff: Option<Vec<DiffLine>>,
}

/// A parsed fix proposal ready for confirmation and application.
///
/// An empty plan is a valid outcome: the model looked at the codebase and
/// proposed nothing.
#[derive(Debug, Clone)]
pub struct FixPlan {
    changes: Vec<PlannedChange>,
}

impl FixPlan {
    fn from_proposal(proposal: FixProposal, codebase: &Codebase) -> Self {
        let changes = proposal
            .changes
            .into_iter()
            .map(|change| {
                let diff = codebase
                    .get(Path::new(&change.file_path))
                    .map(|original| diff_lines(original, &change.fixed_code));
                PlannedChange { change, diff }
            })
            .collect();
        Self { changes }
    }

    /// Planned changes in proposal order.
    pub fn changes(&self) -> &[PlannedChange] {
        &self.changes
    }

    /// Number of planned changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether the model proposed no changes at all.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Use case for proposing fixes to a codebase.
pub struct FixUsecase {
    generation: Arc<dyn GenerationClient>,
}

impl FixUsecase {
    /// Creates a new `FixUsecase`.
    pub fn new(generation: Arc<dyn GenerationClient>) -> Self {
        Self { generation }
    }

    /// Loads the codebase under `path`, asks for a fix for `issue`, and
    /// parses the result into an applicable plan.
    ///
    /// # Arguments
    ///
    /// * `path` - File or directory to scan for source files
    /// * `issue` - Description of what should be fixed or refactored
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` cannot be read, or no supported source file is found there
    /// - The generation request fails
    /// - The response is not a decodable fix proposal
    pub async fn plan(&self, path: &Path, issue: &str) -> Result<FixPlan> {
        let codebase = CodebaseLoader::new(path).load()?;
        if codebase.is_empty() {
            return Err(CodeonError::validation(format!(
                "no supported source files found under {}",
                path.display()
            )));
        }

        tracing::info!(
            "[FixUsecase] Requesting fix proposal for {} file(s)",
            codebase.len()
        );

        let prompt = build_fix_prompt(&codebase, issue);
        let raw = self.generation.generate(&prompt, &fix_options()).await?;
        let proposal = parse_fix_proposal(&raw)?;

        tracing::info!(
            "[FixUsecase] Proposal contains {} change(s)",
            proposal.changes.len()
        );

        Ok(FixPlan::from_proposal(proposal, &codebase))
    }
}

#[cfg(test)]
#[path = "fix_usecase_test.rs"]
mod tests;
