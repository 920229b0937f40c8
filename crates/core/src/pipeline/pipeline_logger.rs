use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for worker loop events.
///
/// Each worker owns its own logger, so implementations need no locking.
pub trait PipelineLogger: Send {
    /// Record how long a named stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. signal depth, face count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger used by tests where output is irrelevant.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger that forwards messages to the `log` facade and keeps per-stage
/// timings and metrics for a summary when the worker stops.
pub struct LogPipelineLogger {
    worker: String,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
}

impl LogPipelineLogger {
    pub fn new(worker: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!("{} summary ({elapsed_s:.1}s running):", self.worker)];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            lines.push(format!(
                "  {stage:10}: {:4} runs  avg {avg_ms:7.1}ms  total {total_ms:8.0}ms",
                durations.len()
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            lines.push(format!("  {name}: avg {avg:.1}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        log::debug!("{}: {stage} took {duration_ms:.1}ms", self.worker);
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.timing("fetch", 5.0);
        logger.metric("faces", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = LogPipelineLogger::new("Processor");
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("upload", 5.0);

        assert_eq!(logger.timings_for("detect").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("upload").unwrap(), &[5.0]);
        assert!(logger.timings_for("fetch").is_none());
    }

    #[test]
    fn test_summary_names_worker_stages_and_metrics() {
        let mut logger = LogPipelineLogger::new("Processor");
        logger.timing("detect", 20.0);
        logger.timing("upload", 5.0);
        logger.metric("faces", 1.0);
        logger.metric("faces", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Processor summary"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("upload"));
        assert!(summary.contains("faces: avg 1.5"));
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = LogPipelineLogger::new("Acquirer");
        logger.metric("pending", 0.0);
        logger.metric("pending", 1.0);
        assert_eq!(logger.metrics_for("pending").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogPipelineLogger::new("Acquirer").summary_string().is_none());
    }
}
