//! End-to-end tests for batch publishing.

#[cfg(test)]
mod tests {
    use crate::admin::{AdminClient, FlowStore};
    use crate::config::AdminSettings;
    use crate::core::{BatchPublishReport, Flow, PublishOutcome, PublishStatus};
    use crate::publish::{
        fetch_progress, publish_progress, LocalStateSync, PublishObserver, PublishOrchestrator,
        RemoteUploader,
    };
    use crate::testing::{
        sample_flow, sample_target, upload_accepted, upload_rejected, InMemoryFlowStore,
        MockTransport,
    };
    use crate::transport::{HttpMethod, HttpResponse};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        transport: Arc<MockTransport>,
        store: Arc<InMemoryFlowStore>,
        orchestrator: PublishOrchestrator,
    }

    fn harness(keys: &[&str]) -> Harness {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(InMemoryFlowStore::with_flows(
            keys.iter().map(|k| sample_flow(k)),
        ));
        let uploader = RemoteUploader::new(transport.clone(), LocalStateSync::new(store.clone()));
        Harness {
            transport,
            store,
            orchestrator: PublishOrchestrator::new(uploader, sample_target()),
        }
    }

    fn flows(keys: &[&str]) -> Vec<Flow> {
        keys.iter().map(|k| sample_flow(k)).collect()
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl PublishObserver for RecordingObserver {
        fn on_fetch_progress(&self, done: usize, total: usize) {
            self.events
                .lock()
                .push(format!("fetch {}%", fetch_progress(done, total)));
        }

        fn on_item_started(&self, index: usize, total: usize, key: &str) {
            self.events
                .lock()
                .push(format!("start {key} {}/{total}", index + 1));
        }

        fn on_item_finished(&self, index: usize, total: usize, outcome: &PublishOutcome) {
            self.events.lock().push(format!(
                "finish {} {}%",
                outcome.key(),
                publish_progress(index + 1, total)
            ));
        }
    }

    fn assert_report_invariants(report: &BatchPublishReport) {
        assert_eq!(report.total(), report.success_count() + report.failure_count());
        assert_eq!(report.total(), report.outcomes().len());
        for outcome in report.outcomes() {
            if outcome.published_at().is_some() {
                assert!(outcome.is_success());
            }
        }
    }

    #[tokio::test]
    async fn test_batch_with_one_rejection() {
        let h = harness(&["a1", "a2", "a3"]);
        h.transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));
        h.transport.push_json(&upload_rejected("duplicate key"));
        h.transport.push_json(&upload_accepted(Some("2024-01-01T00:00:01Z")));

        let report = h.orchestrator.publish_batch(&flows(&["a1", "a2", "a3"])).await;

        assert_report_invariants(&report);
        assert_eq!(report.total(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(
            report.outcomes(),
            &[
                PublishOutcome::succeeded("a1", "Flow a1", Some("2024-01-01T00:00:00Z".into())),
                PublishOutcome::failed("a2", "Flow a2", "duplicate key"),
                PublishOutcome::succeeded("a3", "Flow a3", Some("2024-01-01T00:00:01Z".into())),
            ][..]
        );
        assert_eq!(
            h.store.marks().into_iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["a1", "a3"]
        );
        assert_eq!(h.store.flow("a2").unwrap().publish_status(), PublishStatus::Unpublished);
        assert_eq!(h.store.flow("a3").unwrap().publish_status(), PublishStatus::Published);
    }

    #[tokio::test]
    async fn test_slow_upload_does_not_overlap_next() {
        let h = harness(&["a", "b", "c"]);
        h.transport.push_json(&upload_accepted(None));
        h.transport.push_delayed(
            HttpResponse::json(&upload_accepted(None)),
            Duration::from_millis(50),
        );
        h.transport.push_json(&upload_accepted(None));

        let report = h.orchestrator.publish_batch(&flows(&["a", "b", "c"])).await;

        assert!(report.all_succeeded());
        assert_eq!(h.transport.max_in_flight(), 1);
        assert_eq!(
            h.transport.timeline(),
            vec!["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]
        );
    }

    #[tokio::test]
    async fn test_every_failure_kind_is_isolated() {
        let h = harness(&["a", "b", "c", "d", "e"]);
        h.transport.push(HttpResponse::new(500, "internal error"));
        h.transport.push_json(&json!({"code": 1, "message": "bad key"}));
        h.transport
            .push_error(crate::errors::CodeflowError::transport("connection reset"));
        h.transport.push(HttpResponse::new(200, "not json"));
        h.transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));

        let report = h
            .orchestrator
            .publish_batch(&flows(&["a", "b", "c", "d", "e"]))
            .await;

        assert_report_invariants(&report);
        assert_eq!(report.failure_count(), 4);
        let messages: Vec<Option<&str>> = report.outcomes().iter().map(PublishOutcome::message).collect();
        assert_eq!(messages[0], Some("HTTP 500: internal error"));
        assert_eq!(messages[1], Some("bad key"));
        assert_eq!(messages[2], Some("connection reset"));
        assert!(messages[3].unwrap().starts_with("invalid response"));
        assert!(report.outcomes()[4].is_success());
        assert_eq!(h.transport.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_local_sync_failure_does_not_fail_batch() {
        let h = harness(&["a1", "a2"]);
        h.store.fail_mark_published(true);
        h.transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));
        h.transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));

        let report = h.orchestrator.publish_batch(&flows(&["a1", "a2"])).await;

        assert!(report.all_succeeded());
        assert_eq!(h.store.marks().len(), 2);
        assert!(h.store.flow("a1").unwrap().published_at.is_none());
    }

    #[tokio::test]
    async fn test_republishing_is_allowed() {
        let h = harness(&["a1"]);
        h.transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));
        h.transport.push_json(&upload_accepted(Some("2024-02-01T00:00:00Z")));

        let batch = flows(&["a1"]);
        h.orchestrator.publish_batch(&batch).await;
        let second = h.orchestrator.publish_batch(&batch).await;

        assert!(second.all_succeeded());
        assert_eq!(h.store.marks().len(), 2);
        assert_eq!(h.store.marks()[1].1, "2024-02-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_publish_single() {
        let h = harness(&["a1"]);
        h.transport.push_json(&upload_rejected("duplicate key"));

        let outcome = h.orchestrator.publish_single(&sample_flow("a1")).await;

        assert_eq!(outcome.message(), Some("duplicate key"));
        assert_eq!(h.transport.calls()[0].url, "https://prod.example.com/api/code/upload");
    }

    #[tokio::test]
    async fn test_publish_selected_reports_progress() {
        let h = harness(&["a", "b"]);
        h.transport.push_json(&upload_accepted(None));
        h.transport.push_json(&upload_rejected("nope"));
        let observer = Arc::new(RecordingObserver::default());
        let orchestrator = h.orchestrator.clone().with_observer(observer.clone());

        let report = orchestrator
            .publish_selected(h.store.as_ref(), &["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(report.summary(), "published 1, failed 1");
        assert_eq!(
            *observer.events.lock(),
            vec![
                "fetch 25%",
                "fetch 50%",
                "start a 1/2",
                "finish a 75%",
                "start b 2/2",
                "finish b 100%",
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_selected_aborts_on_missing_flow() {
        let h = harness(&["a"]);

        let result = h
            .orchestrator
            .publish_selected(h.store.as_ref(), &["a".to_string(), "zzz".to_string()])
            .await;

        assert!(result.is_err());
        assert!(h.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_against_admin_backend() {
        let transport = Arc::new(MockTransport::new());
        let admin = Arc::new(AdminClient::new(
            transport.clone(),
            AdminSettings::new("http://admin.local"),
        ));
        let uploader = RemoteUploader::new(transport.clone(), LocalStateSync::new(admin.clone()));
        let orchestrator = PublishOrchestrator::new(uploader, sample_target());

        let record = |key: &str| {
            json!({"code": 0, "data": serde_json::to_value(sample_flow(key)).unwrap()})
        };
        transport.push_json(&record("a1"));
        transport.push_json(&record("a2"));
        transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));
        transport.push(HttpResponse::new(500, "db down"));
        transport.push_json(&upload_accepted(Some("2024-01-01T00:00:05Z")));
        transport.push_json(&json!({"code": 0, "data": null}));

        let report = orchestrator
            .publish_selected(admin.as_ref() as &dyn FlowStore, &["a1".into(), "a2".into()])
            .await
            .unwrap();

        assert!(report.all_succeeded());
        let calls = transport.calls();
        let trace: Vec<(HttpMethod, &str)> =
            calls.iter().map(|c| (c.method, c.url.as_str())).collect();
        assert_eq!(
            trace,
            vec![
                (HttpMethod::Get, "http://admin.local/api/code/flows/a1"),
                (HttpMethod::Get, "http://admin.local/api/code/flows/a2"),
                (HttpMethod::Post, "https://prod.example.com/api/code/upload"),
                (HttpMethod::Put, "http://admin.local/api/code/flows/a1"),
                (HttpMethod::Post, "https://prod.example.com/api/code/upload"),
                (HttpMethod::Put, "http://admin.local/api/code/flows/a2"),
            ]
        );
        assert_eq!(transport.remaining(), 0);
    }
}
