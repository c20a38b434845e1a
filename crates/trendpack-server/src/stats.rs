//! In-memory crawl run stats and log ring buffer.
//!
//! State lives only for the process lifetime and resets on restart. Every
//! recorded log entry is mirrored as a `tracing` event so an external sink
//! sees the same stream.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use trendpack_core::Category;

/// Maximum retained log entries; older entries are evicted.
pub const LOG_CAPACITY: usize = 100;

/// Per-category counters for the most recent run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    pub keywords_collected: usize,
    pub items_crawled: usize,
    pub items_saved: usize,
    pub items_skipped: usize,
    pub errors: usize,
    pub warnings: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One pipeline log line, as exposed by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlLogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub message: String,
}

#[derive(Debug, Default)]
struct Inner {
    stats: HashMap<String, CrawlStats>,
    logs: VecDeque<CrawlLogEntry>,
}

/// Shared registry handed to the pipeline and the status endpoint.
#[derive(Debug, Clone, Default)]
pub struct StatsRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl StatsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the category's counters and stamps the start time.
    pub async fn start_run(&self, category: Category) {
        let mut inner = self.inner.lock().await;
        inner.stats.insert(
            category.as_str().to_owned(),
            CrawlStats {
                started_at: Some(Utc::now()),
                ..CrawlStats::default()
            },
        );
    }

    /// Applies `update` to the category's counters.
    pub async fn update(&self, category: Category, update: impl FnOnce(&mut CrawlStats)) {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .stats
            .entry(category.as_str().to_owned())
            .or_default();
        update(entry);
    }

    /// Stamps the finish time, leaving counters as they stand.
    pub async fn finish_run(&self, category: Category) {
        self.update(category, |stats| {
            stats.finished_at = Some(Utc::now());
        })
        .await;
    }

    /// Records a log entry, evicting the oldest past [`LOG_CAPACITY`], and
    /// mirrors it to `tracing`.
    pub async fn log(
        &self,
        level: LogLevel,
        category: Category,
        keyword: Option<&str>,
        source: Option<&str>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        match level {
            LogLevel::Info => {
                tracing::info!(category = %category, keyword, source, "{message}");
            }
            LogLevel::Warn => {
                tracing::warn!(category = %category, keyword, source, "{message}");
            }
            LogLevel::Error => {
                tracing::error!(category = %category, keyword, source, "{message}");
            }
        }

        let mut inner = self.inner.lock().await;
        if inner.logs.len() >= LOG_CAPACITY {
            inner.logs.pop_front();
        }
        inner.logs.push_back(CrawlLogEntry {
            at: Utc::now(),
            level,
            category: category.as_str().to_owned(),
            keyword: keyword.map(ToOwned::to_owned),
            source: source.map(ToOwned::to_owned),
            message,
        });
    }

    /// Copy of the per-category counters.
    pub async fn stats_snapshot(&self) -> HashMap<String, CrawlStats> {
        self.inner.lock().await.stats.clone()
    }

    /// The most recent `n` log entries, oldest first.
    pub async fn recent_logs(&self, n: usize) -> Vec<CrawlLogEntry> {
        let inner = self.inner.lock().await;
        inner
            .logs
            .iter()
            .skip(inner.logs.len().saturating_sub(n))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_run_resets_previous_counters() {
        let registry = StatsRegistry::new();
        registry.start_run(Category::Product).await;
        registry
            .update(Category::Product, |s| s.items_saved = 7)
            .await;

        registry.start_run(Category::Product).await;

        let snapshot = registry.stats_snapshot().await;
        let stats = snapshot.get("product").expect("product entry");
        assert_eq!(stats.items_saved, 0);
        assert!(stats.started_at.is_some());
        assert!(stats.finished_at.is_none());
    }

    #[tokio::test]
    async fn log_ring_buffer_evicts_oldest() {
        let registry = StatsRegistry::new();
        for i in 0..(LOG_CAPACITY + 5) {
            registry
                .log(
                    LogLevel::Info,
                    Category::Stock,
                    None,
                    None,
                    format!("entry {i}"),
                )
                .await;
        }

        let logs = registry.recent_logs(LOG_CAPACITY * 2).await;
        assert_eq!(logs.len(), LOG_CAPACITY);
        assert_eq!(logs[0].message, "entry 5", "oldest five evicted");
        assert_eq!(
            logs.last().map(|e| e.message.as_str()),
            Some("entry 104"),
            "newest entry retained"
        );
    }

    #[tokio::test]
    async fn recent_logs_returns_the_tail_oldest_first() {
        let registry = StatsRegistry::new();
        for i in 0..4 {
            registry
                .log(LogLevel::Warn, Category::Food, None, None, format!("w{i}"))
                .await;
        }

        let logs = registry.recent_logs(2).await;
        let messages: Vec<&str> = logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["w2", "w3"]);
    }
}
