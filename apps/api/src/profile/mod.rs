// Profile data model and the onboarding flow that builds it.
// Pure local state: no LLM calls happen in this module.

pub mod merge;
pub mod models;
pub mod onboarding;
pub mod update;
