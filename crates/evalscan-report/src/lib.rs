//! evalscan-report — Report generation for evalscan score reports.
//!
//! Renders a [`ScoreReport`](evalscan_core::report::ScoreReport) as a single
//! self-contained HTML page.

pub mod html;
