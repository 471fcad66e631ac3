//! # FinAgent Analytics Engine
//!
//! This crate turns a daily price history into a performance report: rolling
//! indicators, headline risk/return statistics and a short rule-based trend
//! narrative, with every number sanitized for JSON.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O, no async, no shared state. It depends only on
//!   `core-types`. Fetching the series is somebody else's job.
//! - **Stateless Calculation:** `MetricsEngine`, `NarrativeGenerator` and
//!   `ReportAssembler` hold no per-request state. Each stage takes its input by
//!   reference and returns a new value.
//!
//! ## Public API
//!
//! - `ReportAssembler`: the entry point. Series in, `PerformanceReport` out.
//! - `MetricsEngine`: SMA/RSI indicators and the KPI set.
//! - `NarrativeGenerator`: trend and momentum classification.
//! - `sanitizer`: rounding and non-finite filtering.
//! - `AnalyticsError`: the typed failure kinds.

// Declare the modules that constitute this crate.
pub mod assembler;
pub mod engine;
pub mod error;
pub mod narrative;
pub mod report;
pub mod sanitizer;

// Re-export the key components to create a clean, public-facing API.
pub use assembler::ReportAssembler;
pub use engine::{IndicatorSet, KpiSet, MetricsEngine};
pub use error::AnalyticsError;
pub use narrative::{Narrative, NarrativeGenerator, TrendInputs};
pub use report::{HistoryRow, PerformanceReport};
