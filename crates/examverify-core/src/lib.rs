//! examverify-core: exam model, loader, equivalence rules and rule engine.
//!
//! This crate defines the exam data model, the loader for reference and
//! candidate exams, the answer equivalence classifier, and the rule
//! catalogue that the rest of examverify builds on.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod results;
pub mod rules;
