//! Application layer for CodeOn.
//!
//! This crate provides the use case implementations that coordinate the
//! domain and infrastructure layers: the interactive conversation loop and
//! the codebase fix workflow.

pub mod conversation;
pub mod fix_usecase;

pub use conversation::ConversationEngine;
pub use fix_usecase::{FixPlan, FixUsecase, PlannedChange};
