use crate::core::diff::diff_values;
use crate::domain::model::{CompareOutcome, Mode, SampleItem};
use crate::domain::ports::JsonSource;
use crate::utils::error::{HarnessError, Result};
use serde_json::json;

/// Queries both servers for one pair and diffs the answers.
pub struct Comparator<O: JsonSource, N: JsonSource> {
    mode: Mode,
    old: O,
    new: N,
}

impl<O: JsonSource, N: JsonSource> Comparator<O, N> {
    pub fn new(mode: Mode, old: O, new: N) -> Self {
        Self { mode, old, new }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn old_source(&self) -> &O {
        &self.old
    }

    pub fn new_source(&self) -> &N {
        &self.new
    }

    /// `Ok(TimedOut)` for a read timeout; any other request failure is returned as `Err`.
    ///
    /// A fatal failure on either side is returned without waiting for the other request.
    pub async fn compare(&self, item: &SampleItem) -> Result<CompareOutcome> {
        let segments = [
            self.mode.as_str(),
            item.vendor.as_str(),
            item.product.as_str(),
        ];

        let old = self.old.get_json(&segments);
        let new = self.new.get_json(&segments);
        tokio::pin!(old, new);

        let (old, new) = tokio::select! {
            first = &mut old => match first {
                Err(e) if e.is_fatal() => return Err(e),
                first => (first, new.await),
            },
            first = &mut new => match first {
                Err(e) if e.is_fatal() => return Err(e),
                first => (old.await, first),
            },
        };

        let (old_body, new_body) = match (old, new) {
            (Ok(old_body), Ok(new_body)) => (old_body, new_body),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => return self.request_failed(item, e),
            (Err(old_err), Err(new_err)) => {
                // 兩邊都失敗時，以致命錯誤為準
                let e = if old_err.is_fatal() { old_err } else { new_err };
                return self.request_failed(item, e);
            }
        };

        let report = diff_values(&old_body, &new_body);
        if report.is_empty() {
            tracing::debug!("✅ {}/{} matches", item.vendor, item.product);
            return Ok(CompareOutcome::Match);
        }

        let payload = json!({
            "mode": self.mode.as_str(),
            "args": [item.vendor, item.product],
            "diff": report,
        });
        tracing::warn!(
            "There is a difference between old and new(or RDB and Redis):\n {}",
            serde_json::to_string_pretty(&payload)?
        );

        Ok(CompareOutcome::Mismatch(report))
    }

    /// Fatal errors are left for the caller to report.
    fn request_failed(&self, item: &SampleItem, e: HarnessError) -> Result<CompareOutcome> {
        match e {
            HarnessError::Timeout { .. } => {
                tracing::error!("{}, args: ({}, {})", e, item.vendor, item.product);
                Ok(CompareOutcome::TimedOut)
            }
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{HttpEndpoint, RetryingClient};
    use crate::config::{HttpSettings, RetryPolicy};
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Canned answers keyed by joined path.
    struct StaticSource {
        bodies: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticSource {
        fn new(entries: &[(&str, Value)]) -> Self {
            Self {
                bodies: entries
                    .iter()
                    .map(|(path, body)| (path.to_string(), body.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JsonSource for StaticSource {
        fn base_url(&self) -> &str {
            "static://"
        }

        async fn get_json(&self, segments: &[&str]) -> Result<Value> {
            let path = segments.join("/");
            self.calls.lock().unwrap().push(path.clone());
            Ok(self.bodies.get(&path).cloned().unwrap_or(Value::Null))
        }
    }

    /// Always fails with whatever the closure builds.
    struct FailingSource<F: Fn() -> HarnessError + Send + Sync>(F);

    #[async_trait]
    impl<F: Fn() -> HarnessError + Send + Sync> JsonSource for FailingSource<F> {
        fn base_url(&self) -> &str {
            "failing://"
        }

        async fn get_json(&self, _segments: &[&str]) -> Result<Value> {
            Err((self.0)())
        }
    }

    #[tokio::test]
    async fn test_matching_bodies() {
        let old = StaticSource::new(&[("cpes/vendorA/productA", json!({"cpes": ["a", "b"]}))]);
        let new = StaticSource::new(&[("cpes/vendorA/productA", json!({"cpes": ["b", "a"]}))]);
        let comparator = Comparator::new(Mode::Cpes, old, new);

        let outcome = comparator
            .compare(&SampleItem::new("vendorA", "productA"))
            .await
            .unwrap();

        assert_eq!(outcome, CompareOutcome::Match);
        assert_eq!(
            *comparator.old.calls.lock().unwrap(),
            vec!["cpes/vendorA/productA".to_string()]
        );
    }

    #[tokio::test]
    async fn test_mismatching_bodies() {
        let old = StaticSource::new(&[("cpes/vendorA/productA", json!({"x": 1}))]);
        let new = StaticSource::new(&[("cpes/vendorA/productA", json!({"x": 2}))]);
        let comparator = Comparator::new(Mode::Cpes, old, new);

        let outcome = comparator
            .compare(&SampleItem::new("vendorA", "productA"))
            .await
            .unwrap();

        match outcome {
            CompareOutcome::Mismatch(report) => {
                assert_eq!(
                    serde_json::to_value(&report).unwrap(),
                    json!({"values_changed": {"root['x']": {"old_value": 1, "new_value": 2}}})
                );
            }
            other => panic!("expected Mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pair_with_special_characters_is_passed_through() {
        let old = StaticSource::new(&[("cpes/a b/c|d", json!(1))]);
        let new = StaticSource::new(&[("cpes/a b/c|d", json!(1))]);
        let comparator = Comparator::new(Mode::Cpes, old, new);

        let outcome = comparator
            .compare(&SampleItem::new("a b", "c|d"))
            .await
            .unwrap();
        assert_eq!(outcome, CompareOutcome::Match);
    }

    fn slow_endpoint(server: &MockServer) -> HttpEndpoint {
        server.mock(|when, then| {
            when.method(GET);
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({}));
        });

        let http = HttpSettings {
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_millis(200),
        };
        let client = RetryingClient::new(&http, RetryPolicy::disabled()).unwrap();
        HttpEndpoint::new(&server.base_url(), client).unwrap()
    }

    #[tokio::test]
    async fn test_timeout_is_skipped() {
        let server = MockServer::start();
        let old = StaticSource::new(&[("cpes/v/p", json!({"x": 1}))]);
        let comparator = Comparator::new(Mode::Cpes, old, slow_endpoint(&server));

        let outcome = comparator.compare(&SampleItem::new("v", "p")).await.unwrap();
        assert_eq!(outcome, CompareOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_other_failures_are_propagated() {
        let old = StaticSource::new(&[]);
        let new = FailingSource(|| HarnessError::RetriesExhausted {
            url: "http://127.0.0.1:1326/cpes/v/p".to_string(),
            status: 504,
            attempts: 6,
        });
        let comparator = Comparator::new(Mode::Cpes, old, new);

        let result = comparator.compare(&SampleItem::new("v", "p")).await;
        assert!(matches!(result, Err(HarnessError::RetriesExhausted { .. })));
    }

    #[tokio::test]
    async fn test_fatal_error_wins_over_timeout() {
        let server = MockServer::start();
        let comparator = Comparator::new(
            Mode::Cpes,
            slow_endpoint(&server),
            FailingSource(|| HarnessError::ConfigError {
                message: "new server misconfigured".to_string(),
            }),
        );

        let result = comparator.compare(&SampleItem::new("v", "p")).await;
        assert!(matches!(result, Err(HarnessError::ConfigError { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_does_not_wait_for_other_side() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
        drop(listener);

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200)
                .delay(Duration::from_secs(4))
                .json_body(json!({}));
        });

        let http = HttpSettings {
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(10),
        };
        let client = RetryingClient::new(&http, RetryPolicy::disabled()).unwrap();
        let comparator = Comparator::new(
            Mode::Cpes,
            HttpEndpoint::new(&closed, client.clone()).unwrap(),
            HttpEndpoint::new(&server.base_url(), client).unwrap(),
        );

        let started = std::time::Instant::now();
        let result = comparator.compare(&SampleItem::new("v", "p")).await;

        assert!(matches!(result, Err(HarnessError::Connection { .. })), "{:?}", result);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
