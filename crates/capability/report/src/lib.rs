//! # Uptime Report
//!
//! 报表生命周期：触发、后台计算、逐批落盘、CSV 产物、状态查询。

pub mod artifact;
pub mod error;
pub mod service;

pub use artifact::{ArtifactSink, CSV_HEADER, CsvArtifactSink, render_csv};
pub use error::ReportError;
pub use service::{ReportBatchSink, ReportService};
