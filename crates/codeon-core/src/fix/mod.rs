//! Fix proposal domain module.
//!
//! This module contains the structured multi-file edit protocol: the typed
//! proposal model, request prompt construction, response parsing, and diff
//! computation.
//!
//! # Module Structure
//!
//! - `model`: Typed proposal model (`FixProposal`, `FileChange`, `ChangeDescriptor`)
//! - `prompt`: Fix request prompt construction and generation options
//! - `parse`: Raw model response to typed proposal
//! - `diff`: Line-based diff between original and proposed content

mod diff;
mod model;
mod parse;
mod prompt;

// Re-export public API
pub use diff::{DiffLine, diff_lines};
pub use model::{ChangeDescriptor, FileChange, FixProposal};
pub use parse::{parse_fix_proposal, strip_code_fences};
pub use prompt::{FIX_MAX_OUTPUT_TOKENS, FIX_TEMPERATURE, build_fix_prompt, fix_options};
