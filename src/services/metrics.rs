use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::db::reports::{self, LabelCount};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_students: i64,
    pub total_instructors: i64,
    pub total_courses: i64,
    pub total_departments: i64,
    pub active_enrollments: i64,
    pub pending_approvals: i64,
    pub average_gpa: f64,
    pub generated_at: DateTime<Utc>,
}

pub async fn collect_metrics(db: &SqlitePool) -> Result<DashboardMetrics, AppError> {
    let totals = reports::totals(db).await?;
    Ok(DashboardMetrics {
        total_students: totals.students,
        total_instructors: totals.instructors,
        total_courses: totals.courses,
        total_departments: totals.departments,
        active_enrollments: totals.active_enrollments,
        pending_approvals: totals.pending_approvals,
        average_gpa: totals.average_gpa.unwrap_or(0.0),
        generated_at: Utc::now(),
    })
}

const GPA_BUCKETS: [(f64, f64, &str); 5] = [
    (0.0, 1.0, "0.0-1.0"),
    (1.0, 2.0, "1.0-2.0"),
    (2.0, 3.0, "2.0-3.0"),
    (3.0, 3.5, "3.0-3.5"),
    (3.5, 4.0, "3.5-4.0"),
];

/// Half-open buckets, except the last which includes 4.0.
pub fn gpa_distribution(gpas: &[f64]) -> Vec<LabelCount> {
    GPA_BUCKETS
        .iter()
        .enumerate()
        .map(|(i, (low, high, label))| {
            let last = i == GPA_BUCKETS.len() - 1;
            let count = gpas
                .iter()
                .filter(|g| **g >= *low && (**g < *high || (last && **g <= *high)))
                .count();
            LabelCount {
                label: label.to_string(),
                count: count as i64,
            }
        })
        .collect()
}

/// Where freshly computed dashboard metrics go.
#[async_trait]
pub trait MetricsPublisher: Send + Sync {
    async fn publish(&self, metrics: DashboardMetrics) -> Result<(), AppError>;
}

/// Keeps only the latest snapshot; readers hold a `watch::Receiver`.
pub struct WatchPublisher {
    tx: watch::Sender<Option<DashboardMetrics>>,
}

impl WatchPublisher {
    pub fn channel() -> (Self, watch::Receiver<Option<DashboardMetrics>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MetricsPublisher for WatchPublisher {
    async fn publish(&self, metrics: DashboardMetrics) -> Result<(), AppError> {
        // send_replace never fails, even with every receiver gone.
        self.tx.send_replace(Some(metrics));
        Ok(())
    }
}

pub struct NoopMetricsPublisher;

#[async_trait]
impl MetricsPublisher for NoopMetricsPublisher {
    async fn publish(&self, _metrics: DashboardMetrics) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_cover_scale() {
        let dist = gpa_distribution(&[0.0, 0.99, 1.0, 2.5, 3.2, 3.5, 4.0]);
        let counts: Vec<i64> = dist.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1, 2]);
        assert_eq!(dist[4].label, "3.5-4.0");
    }

    #[tokio::test]
    async fn watch_publisher_keeps_latest() {
        let (publisher, rx) = WatchPublisher::channel();
        assert!(rx.borrow().is_none());

        let metrics = DashboardMetrics {
            total_students: 3,
            total_instructors: 1,
            total_courses: 2,
            total_departments: 1,
            active_enrollments: 4,
            pending_approvals: 1,
            average_gpa: 3.1,
            generated_at: Utc::now(),
        };
        publisher.publish(metrics.clone()).await.unwrap();
        assert_eq!(rx.borrow().as_ref(), Some(&metrics));
    }
}
