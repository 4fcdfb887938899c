//! Text summary, file exports and charts for a finished run.
mod charts;
mod export;
mod summary;


pub use charts::{
    chart_base_name, plot_latency_timeline, plot_requests_per_second, write_charts,
};
pub use export::{export_csv, export_json};
pub use summary::{print_summary, summary_lines};
