pub mod completion_sweep;
pub mod enrollment_service;
pub mod metrics;
pub mod scheduler;

pub use completion_sweep::{CompletionSweep, SweepStats};
pub use enrollment_service::{ApprovalToggleOutcome, EnrollmentService};
pub use metrics::{DashboardMetrics, MetricsPublisher, NoopMetricsPublisher, WatchPublisher};
pub use scheduler::{MetricsScheduler, SweepScheduler};
