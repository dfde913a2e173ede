//! End-to-end tests: mock stream → monitor → derived progress.

#[cfg(test)]
mod tests {
    use crate::config::MonitorConfig;
    use crate::core::{ConnectionState, OverallStatus, StageId, StageStatus};
    use crate::errors::TransportError;
    use crate::monitor::ProcessingMonitor;
    use crate::testing::{
        assert_overall, assert_stage_status, assert_stage_statuses, eventually, fixtures,
        MockEventSource,
    };
    use crate::transport::Principal;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn setup() -> (ProcessingMonitor, Arc<MockEventSource>) {
        let source = Arc::new(MockEventSource::new());
        let monitor = ProcessingMonitor::new(MonitorConfig::new(), source.clone()).unwrap();
        (monitor, source)
    }

    fn user(id: &str) -> Option<Principal> {
        Some(Principal::new(id).with_access_token("token"))
    }

    async fn connected(monitor: &ProcessingMonitor) {
        eventually(|| monitor.connection_state() == ConnectionState::Connected).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_completes() {
        let (monitor, source) = setup();
        assert!(monitor.set_principal(user("1")));
        connected(&monitor).await;
        monitor.begin_run();

        source.send(fixtures::document_uploaded_frame(5, "invoice.pdf"));
        let labels = fixtures::full_document_run();
        for label in &labels {
            source.send(fixtures::step_frame(label));
        }
        source.send(fixtures::complete_frame("ONAY"));
        let expected = labels.len() + 2;
        eventually(|| monitor.log().len() == expected).await;
        monitor.finish_run();

        let snapshot = monitor.snapshot();
        assert_stage_statuses(&snapshot.progress, &[StageStatus::Completed; 4]);
        assert_overall(&snapshot.progress, OverallStatus::Completed);
        assert_eq!(snapshot.progress.current_stage(), Some(StageId::Decision));
        assert!(snapshot.summary.is_completed);
        assert!(!snapshot.summary.show_progress);
        assert_eq!(snapshot.summary.recent.len(), 3);
        assert_eq!(snapshot.latest_label(), Some("İşlem Tamamlandı"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_while_in_flight() {
        let (monitor, source) = setup();
        monitor.set_principal(user("1"));
        connected(&monitor).await;
        monitor.begin_run();

        source.send(fixtures::document_uploaded_frame(5, "invoice.pdf"));
        eventually(|| monitor.log().len() == 1).await;
        let progress = monitor.progress();
        assert_stage_status(&progress, StageId::Upload, StageStatus::Completed);
        assert_stage_status(&progress, StageId::Ocr, StageStatus::Pending);
        assert_eq!(progress.current_stage(), Some(StageId::Upload));
        assert_overall(&progress, OverallStatus::InProgress);

        source.send(fixtures::step_frame("OCR İşlemi Başlatıldı"));
        eventually(|| monitor.log().len() == 2).await;
        let progress = monitor.progress();
        assert_stage_status(&progress, StageId::Ocr, StageStatus::Active);
        assert_eq!(progress.current_stage(), Some(StageId::Ocr));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_error_is_sticky() {
        let (monitor, source) = setup();
        monitor.set_principal(user("1"));
        connected(&monitor).await;
        monitor.begin_run();

        source.send(fixtures::step_frame("OCR İşlemi Başlatıldı"));
        source.send(fixtures::step_frame_with_details(
            "OCR Tamamlandı",
            json!({"status": "error", "reason": "unreadable"}),
        ));
        source.send(fixtures::step_frame("NLP Analizi Başlatıldı"));
        source.send(fixtures::error_frame("OCR failed"));
        eventually(|| monitor.log().len() == 4).await;

        let snapshot = monitor.snapshot();
        assert_stage_status(&snapshot.progress, StageId::Ocr, StageStatus::Error);
        assert_stage_status(&snapshot.progress, StageId::Nlp, StageStatus::Active);
        assert_overall(&snapshot.progress, OverallStatus::Error);
        assert!(snapshot.summary.has_error);
        assert!(!snapshot.summary.show_progress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_twice_single_connection() {
        let (monitor, source) = setup();
        assert!(monitor.set_principal(user("1")));
        assert!(!monitor.set_principal(user("1")));
        connected(&monitor).await;
        assert!(!monitor.set_principal(user("1")));

        assert_eq!(source.open_count(), 1);
        assert_eq!(source.live_connections(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_principal_change_restarts_stream() {
        let (monitor, source) = setup();
        monitor.set_principal(user("1"));
        connected(&monitor).await;
        monitor.begin_run();
        source.send(fixtures::step_frame("Dosya Okundu"));
        eventually(|| monitor.log().len() == 1).await;

        assert!(monitor.set_principal(user("2")));
        assert!(monitor.log().is_empty());
        assert!(!monitor.in_flight());
        connected(&monitor).await;

        assert_eq!(source.open_count(), 2);
        assert_eq!(source.live_connections(), 1);
        assert_eq!(source.last_principal().unwrap().user_id(), "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_without_duplicates() {
        let (monitor, source) = setup();
        monitor.set_principal(user("1"));
        connected(&monitor).await;
        monitor.begin_run();

        source.send(fixtures::step_frame("OCR İşlemi Başlatıldı"));
        eventually(|| monitor.log().len() == 1).await;

        source.break_connection(TransportError::stream("connection reset"));
        eventually(|| monitor.connection_state() == ConnectionState::Error).await;
        let snapshot = monitor.snapshot();
        assert!(snapshot.connection_degraded());
        assert_eq!(snapshot.reconnect_attempts, 1);
        assert!(snapshot.last_error.is_some());

        connected(&monitor).await;
        source.send(fixtures::step_frame("OCR Tamamlandı"));
        eventually(|| monitor.log().len() == 2).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(monitor.log().len(), 2);
        let progress = monitor.progress();
        assert_eq!(progress.stage(StageId::Ocr).unwrap().matched, 2);
        assert_stage_status(&progress, StageId::Ocr, StageStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_cancels_reconnect_and_clears() {
        let (monitor, source) = setup();
        monitor.set_principal(user("1"));
        connected(&monitor).await;
        monitor.begin_run();
        source.send(fixtures::step_frame("Dosya Okundu"));
        eventually(|| monitor.log().len() == 1).await;

        source.break_connection(TransportError::stream("reset"));
        eventually(|| monitor.transport().reconnect_pending()).await;

        assert!(!monitor.set_principal(None));
        assert!(monitor.log().is_empty());
        assert!(!monitor.in_flight());
        assert_eq!(monitor.connection_state(), ConnectionState::Disconnected);

        tokio::time::sleep(monitor.config().reconnect_delay() * 2).await;
        assert_eq!(source.open_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_mid_run_then_continue() {
        let (monitor, source) = setup();
        monitor.set_principal(user("1"));
        connected(&monitor).await;
        monitor.begin_run();

        source.send(fixtures::step_frame("NLP Analizi Başlatıldı"));
        eventually(|| monitor.log().len() == 1).await;
        monitor.clear();
        assert_overall(&monitor.progress(), OverallStatus::Idle);

        source.send(fixtures::step_frame("Karar Verme Başlatıldı"));
        eventually(|| monitor.log().len() == 1).await;
        let progress = monitor.progress();
        assert_stage_status(&progress, StageId::Nlp, StageStatus::Pending);
        assert_stage_status(&progress, StageId::Decision, StageStatus::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let (monitor, source) = setup();
        let mut revisions = monitor.subscribe();
        let mut connection = monitor.subscribe_connection();

        monitor.set_principal(user("1"));
        tokio::time::timeout(Duration::from_secs(1), async {
            while *connection.borrow_and_update() != ConnectionState::Connected {
                connection.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        let before = *revisions.borrow_and_update();
        source.send(fixtures::step_frame("Dosya Okundu"));
        tokio::time::timeout(Duration::from_secs(1), revisions.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(*revisions.borrow() > before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_closes_stream() {
        let (monitor, source) = setup();
        monitor.set_principal(user("1"));
        connected(&monitor).await;

        drop(monitor);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.live_connections(), 0);
    }
}
