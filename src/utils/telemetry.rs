// file: src/utils/telemetry.rs
// description: health checks for upstream services and operation timing
// reference: internal observability helpers

use crate::retriever::WeaviateClient;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthCheck {
    fn with_status(
        component: &str,
        status: HealthStatus,
        message: Option<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            component: component.to_string(),
            status,
            message,
            response_time_ms: response_time.as_millis() as u64,
        }
    }

    pub fn healthy(component: &str, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Healthy, None, response_time)
    }

    pub fn degraded(component: &str, message: String) -> Self {
        Self::with_status(component, HealthStatus::Degraded, Some(message), Duration::ZERO)
    }

    pub fn unhealthy(component: &str, message: String, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Unhealthy, Some(message), response_time)
    }

    /// Probe the vector database readiness endpoint.
    pub async fn weaviate(client: &WeaviateClient) -> Self {
        let start = Instant::now();
        match client.is_ready().await {
            Ok(true) => Self::healthy("weaviate", start.elapsed()),
            Ok(false) => Self::unhealthy("weaviate", "not ready".to_string(), start.elapsed()),
            Err(e) => Self::unhealthy("weaviate", e.to_string(), start.elapsed()),
        }
    }

    /// Report whether an optional service has been configured.
    pub fn configured(component: &str, configured: bool) -> Self {
        if configured {
            Self::healthy(component, Duration::ZERO)
        } else {
            Self::degraded(component, "not configured".to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: i64,
    pub version: String,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let overall_status = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            overall_status,
            checks,
            timestamp: chrono::Utc::now().timestamp(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn format(&self) -> String {
        let mut output = format!(
            "{} System Health: {:?}\nVersion: {}\nTimestamp: {}\n\n",
            self.overall_status.icon(),
            self.overall_status,
            self.version,
            chrono::DateTime::from_timestamp(self.timestamp, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        for check in &self.checks {
            output.push_str(&format!(
                "{} {} ({:?}) - {}ms",
                check.status.icon(),
                check.component,
                check.status,
                check.response_time_ms
            ));

            if let Some(ref msg) = check.message {
                output.push_str(&format!("\n  {}", msg));
            }

            output.push('\n');
        }

        output
    }
}

pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} in {:.2}s",
            self.operation,
            elapsed.as_secs_f64()
        );
        elapsed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub operation: String,
    pub count: usize,
    pub duration_ms: u64,
    pub throughput: f64, // items per second
}

impl PerformanceMetrics {
    pub fn new(operation: &str, count: usize, duration: Duration) -> Self {
        let duration_secs = duration.as_secs_f64();
        let throughput = if duration_secs > 0.0 {
            count as f64 / duration_secs
        } else {
            0.0
        };

        Self {
            operation: operation.to_string(),
            count,
            duration_ms: duration.as_millis() as u64,
            throughput,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "{}: {} items in {}ms ({:.2} items/sec)",
            self.operation, self.count, self.duration_ms, self.throughput
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_report_overall_status() {
        let checks = vec![
            HealthCheck::healthy("weaviate", Duration::from_millis(10)),
            HealthCheck::configured("chat", false),
        ];
        let report = HealthReport::new(checks);
        assert_eq!(report.overall_status, HealthStatus::Degraded);

        let checks = vec![
            HealthCheck::unhealthy("weaviate", "refused".to_string(), Duration::ZERO),
            HealthCheck::configured("chat", true),
        ];
        assert_eq!(HealthReport::new(checks).overall_status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_health_report_format() {
        let report = HealthReport::new(vec![HealthCheck::unhealthy(
            "weaviate",
            "connection refused".to_string(),
            Duration::from_millis(3),
        )]);

        let text = report.format();
        assert!(text.contains("✗ weaviate (Unhealthy) - 3ms"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_performance_metrics() {
        let metrics = PerformanceMetrics::new("import", 100, Duration::from_secs(10));
        assert_eq!(metrics.throughput, 10.0);
        assert!(metrics.format().starts_with("import: 100 items in 10000ms"));
    }

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("test");
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.finish() >= Duration::from_millis(10));
    }
}
