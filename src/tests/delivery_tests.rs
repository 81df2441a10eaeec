//! tests/delivery_tests.rs
//! Pruebas del ruteo de mensajes con proveedores mock.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_rt::test;

    use crate::models::delivery_model::OutboundMessage;
    use crate::models::enums::{ChannelType, FallbackReason, RoutingStrategy};
    use crate::services::provider_service::{MockProvider, ProviderError, ProviderRegistry};
    use crate::tests::common::{config_request, services, services_with, TestServices};

    fn registry_with_failing(name: &str, channel: ChannelType, error: ProviderError) -> ProviderRegistry {
        let mut registry = ProviderRegistry::with_mock_defaults();
        registry.register(Arc::new(MockProvider::failing(name, channel, error)));
        registry
    }

    async fn sms_config(svc: &TestServices, primary: &str, fallback: Option<&str>, enable_fallback: bool) {
        let mut req = config_request(ChannelType::Sms, primary, 1, true);
        req.fallback_provider = fallback.map(str::to_string);
        req.enable_fallback = enable_fallback;
        svc.config.create_config(req).await.unwrap();
    }

    #[test]
    async fn test_primary_success_records_single_attempt() {
        let svc = services().await;
        sms_config(&svc, "MockSMSProvider", Some("BackupSMSProvider"), true).await;

        let outcome = svc
            .delivery
            .route_message(OutboundMessage::new(10, ChannelType::Sms, "+15550001"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.attempt_number, 1);
        assert_eq!(outcome.provider_name, "MockSMSProvider");
        assert!(outcome.external_id.as_deref().unwrap().starts_with("mock-"));
        assert_eq!(outcome.cost, Some(0.0075));
        assert!(outcome.fallback_reason.is_none());
        assert!(!outcome.retry.should_retry);

        let attempts = svc.attempts.list_attempts_for_message(10).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].success);
        assert_eq!(attempts[0].provider_name.as_deref(), Some("MockSMSProvider"));
        assert!(attempts[0].fallback_reason.is_none());
    }

    #[test]
    async fn test_primary_failure_falls_back() {
        let svc = services_with(registry_with_failing(
            "FlakySMS",
            ChannelType::Sms,
            ProviderError::Unavailable("connection refused".to_string()),
        ))
        .await;
        sms_config(&svc, "FlakySMS", Some("BackupSMSProvider"), true).await;

        let outcome = svc
            .delivery
            .route_message(OutboundMessage::new(11, ChannelType::Sms, "+15550002"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.provider_name, "BackupSMSProvider");
        assert_eq!(outcome.fallback_reason, Some(FallbackReason::ProviderUnavailable));

        let attempts = svc.attempts.list_attempts_for_message(11).await.unwrap();
        assert_eq!(attempts.len(), 2);
        assert!(!attempts[0].success);
        assert_eq!(attempts[0].error_code.as_deref(), Some("ProviderUnavailable"));
        assert!(attempts[0].fallback_reason.is_none());
        assert!(attempts[1].success);
        assert_eq!(attempts[1].attempt_number, attempts[0].attempt_number);
        assert_eq!(
            attempts[1].fallback_reason,
            Some(FallbackReason::ProviderUnavailable)
        );
    }

    #[test]
    async fn test_both_providers_fail_schedules_retry() {
        let mut registry = registry_with_failing(
            "FlakySMS",
            ChannelType::Sms,
            ProviderError::Rejected {
                code: Some("429".to_string()),
                message: "rate limit exceeded".to_string(),
            },
        );
        registry.register(Arc::new(MockProvider::failing(
            "DeadBackup",
            ChannelType::Sms,
            ProviderError::Timeout("no answer".to_string()),
        )));
        let svc = services_with(registry).await;
        sms_config(&svc, "FlakySMS", Some("DeadBackup"), true).await;

        let mut message = OutboundMessage::new(12, ChannelType::Sms, "+15550003");
        message.retry_count = 1;

        let outcome = svc.delivery.route_message(message).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.attempt_number, 2);
        assert_eq!(outcome.provider_name, "DeadBackup");
        assert_eq!(outcome.fallback_reason, Some(FallbackReason::RateLimitExceeded));
        assert!(outcome.error.as_deref().unwrap().contains("timeout"));
        assert!(outcome.retry.should_retry);
        // Siguiente intento = 2 -> 60 * 2
        assert_eq!(outcome.retry.delay_seconds, 120);

        let attempts = svc.attempts.list_attempts_for_message(12).await.unwrap();
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|a| !a.success && a.attempt_number == 2));
    }

    #[test]
    async fn test_retry_exhausted() {
        let svc = services_with(registry_with_failing(
            "FlakySMS",
            ChannelType::Sms,
            ProviderError::Unavailable("down".to_string()),
        ))
        .await;
        sms_config(&svc, "FlakySMS", None, true).await;

        let mut message = OutboundMessage::new(13, ChannelType::Sms, "+15550004");
        message.retry_count = 3;

        let outcome = svc.delivery.route_message(message).await.unwrap();
        assert!(!outcome.success);
        assert!(!outcome.retry.should_retry);
        assert_eq!(svc.attempts.list_attempts_for_message(13).await.unwrap().len(), 1);
    }

    #[test]
    async fn test_fallback_disabled_makes_single_attempt() {
        let svc = services_with(registry_with_failing(
            "FlakySMS",
            ChannelType::Sms,
            ProviderError::Unavailable("down".to_string()),
        ))
        .await;
        sms_config(&svc, "FlakySMS", Some("BackupSMSProvider"), false).await;

        let outcome = svc
            .delivery
            .route_message(OutboundMessage::new(14, ChannelType::Sms, "+15550005"))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.fallback_reason.is_none());
        assert_eq!(svc.attempts.list_attempts_for_message(14).await.unwrap().len(), 1);
    }

    #[test]
    async fn test_unknown_provider_is_recorded_as_failure() {
        let svc = services().await;
        sms_config(&svc, "NotRegistered", None, true).await;

        let outcome = svc
            .delivery
            .route_message(OutboundMessage::new(15, ChannelType::Sms, "+15550006"))
            .await
            .unwrap();
        assert!(!outcome.success);

        let attempts = svc.attempts.list_attempts_for_message(15).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].error_code.as_deref(), Some("ProviderNotFound"));
    }

    #[test]
    async fn test_provider_for_wrong_channel_is_rejected() {
        let svc = services().await;
        sms_config(&svc, "MockEmailProvider", None, true).await;

        let outcome = svc
            .delivery
            .route_message(OutboundMessage::new(16, ChannelType::Sms, "+15550007"))
            .await
            .unwrap();
        assert!(!outcome.success);

        let attempts = svc.attempts.list_attempts_for_message(16).await.unwrap();
        assert_eq!(attempts[0].error_code.as_deref(), Some("ChannelMismatch"));
    }

    #[test]
    async fn test_without_config_uses_default_mock() {
        let svc = services().await;

        let outcome = svc
            .delivery
            .route_message(OutboundMessage::new(17, ChannelType::Email, "a@example.com"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.provider_name, "MockEmailProvider");
    }

    #[test]
    async fn test_cost_based_routes_to_cheaper_provider() {
        let svc = services().await;
        let mut req = config_request(ChannelType::Mms, "BackupMMSProvider", 1, true);
        req.fallback_provider = Some("MockMMSProvider".to_string());
        req.routing_strategy = RoutingStrategy::CostBased;
        svc.config.create_config(req).await.unwrap();

        let outcome = svc
            .delivery
            .route_message(OutboundMessage::new(18, ChannelType::Mms, "+15550008"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.provider_name, "MockMMSProvider");
    }

    #[test]
    async fn test_retry_delay_preview_uses_active_config() {
        let svc = services().await;
        let mut req = config_request(ChannelType::Email, "MockEmailProvider", 1, true);
        req.initial_retry_delay_seconds = 120;
        req.max_retry_delay_seconds = 7200;
        svc.config.create_config(req).await.unwrap();

        let preview = svc
            .delivery
            .retry_delay_preview(ChannelType::Email, 3)
            .await
            .unwrap();
        assert_eq!(preview.delay_seconds, 480);

        let default_preview = svc
            .delivery
            .retry_delay_preview(ChannelType::Sms, 3)
            .await
            .unwrap();
        assert_eq!(default_preview.delay_seconds, 240);
    }
}
