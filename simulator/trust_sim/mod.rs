//! # Trust Simulator Front-End
//!
//! Console-side collaborators of the `cnt_sim` engine: event sinks for
//! observing a run, and the paginated end-of-run report.
//!
//! This is a standalone tool that uses the core `cnt_sim` library.

pub mod event_sinks;
pub mod report;

pub use event_sinks::{CollectorEventSink, ConsoleEventSink, CsvEventSink, MultiEventSink};
pub use report::{print_summary, render_report, ReportPage};
