//! examverify-report: SARIF and Markdown renderings of a verification report.

pub mod markdown;
pub mod sarif;
