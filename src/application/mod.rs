//! Application layer (use-cases, policies).
//!
//! This module orchestrates domain logic behind the collaborator contracts
//! of `infra` without depending on a UI framework.

pub mod preview;
