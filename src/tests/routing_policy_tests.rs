//! tests/routing_policy_tests.rs

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::models::enums::{ChannelType, FallbackReason, RetryStrategy, RoutingStrategy};
    use crate::models::routing_model::ChannelRoutingConfig;
    use crate::services::routing_policy::{
        alternate_provider, calculate_retry_delay, classify_fallback_reason,
        default_provider_name, retry_delay_for, select_provider, should_retry,
    };

    fn config(strategy: RoutingStrategy) -> ChannelRoutingConfig {
        ChannelRoutingConfig {
            id: 1,
            channel: ChannelType::Sms,
            primary_provider: "Primary".to_string(),
            fallback_provider: Some("Backup".to_string()),
            routing_strategy: strategy,
            enable_fallback: true,
            max_retries: 3,
            retry_strategy: RetryStrategy::Exponential,
            initial_retry_delay_seconds: 60,
            max_retry_delay_seconds: 3600,
            cost_threshold: None,
            is_active: true,
            priority: 1,
            additional_settings: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn costs(name: &str) -> Option<f64> {
        match name {
            "Primary" => Some(0.02),
            "Backup" => Some(0.01),
            _ => None,
        }
    }

    #[test]
    fn test_exponential_delay_doubles_and_caps() {
        let delays: Vec<i64> = (1..=8)
            .map(|n| calculate_retry_delay(RetryStrategy::Exponential, n, 60, 3600))
            .collect();
        assert_eq!(delays, vec![60, 120, 240, 480, 960, 1920, 3600, 3600]);
    }

    #[test]
    fn test_linear_and_custom_delay() {
        assert_eq!(calculate_retry_delay(RetryStrategy::Linear, 3, 30, 1000), 90);
        assert_eq!(calculate_retry_delay(RetryStrategy::Custom, 4, 30, 1000), 120);
        assert_eq!(calculate_retry_delay(RetryStrategy::Linear, 100, 30, 1000), 1000);
    }

    #[test]
    fn test_no_retry_strategy_has_zero_delay() {
        assert_eq!(calculate_retry_delay(RetryStrategy::None, 5, 60, 3600), 0);
    }

    #[test]
    fn test_huge_attempt_number_does_not_overflow() {
        assert_eq!(
            calculate_retry_delay(RetryStrategy::Exponential, i32::MAX, 60, 7200),
            7200
        );
        assert_eq!(
            calculate_retry_delay(RetryStrategy::Linear, i32::MAX, i64::MAX, 10),
            10
        );
    }

    #[test]
    fn test_retry_delay_without_config_uses_defaults() {
        assert_eq!(retry_delay_for(None, 1), 60);
        assert_eq!(retry_delay_for(None, 2), 120);
        assert_eq!(retry_delay_for(None, 20), 3600);
    }

    #[test]
    fn test_should_retry_respects_config_max() {
        let mut cfg = config(RoutingStrategy::Primary);
        cfg.max_retries = 2;

        let first = should_retry(Some(&cfg), 0, 10);
        assert!(first.should_retry);
        assert_eq!(first.delay_seconds, 60);

        let second = should_retry(Some(&cfg), 1, 10);
        assert!(second.should_retry);
        assert_eq!(second.delay_seconds, 120);

        let exhausted = should_retry(Some(&cfg), 2, 10);
        assert!(!exhausted.should_retry);
        assert_eq!(exhausted.delay_seconds, 0);
    }

    #[test]
    fn test_should_retry_falls_back_to_message_max() {
        assert!(should_retry(None, 4, 5).should_retry);
        assert!(!should_retry(None, 5, 5).should_retry);
    }

    #[test]
    fn test_classify_fallback_reason() {
        assert_eq!(
            classify_fallback_reason("Rate limit exceeded for account"),
            FallbackReason::RateLimitExceeded
        );
        assert_eq!(
            classify_fallback_reason("request was THROTTLED"),
            FallbackReason::RateLimitExceeded
        );
        assert_eq!(
            classify_fallback_reason("provider unavailable: connection refused"),
            FallbackReason::ProviderUnavailable
        );
        assert_eq!(
            classify_fallback_reason("gateway timeout"),
            FallbackReason::ProviderUnavailable
        );
        assert_eq!(
            classify_fallback_reason("monthly quota reached"),
            FallbackReason::CostThreshold
        );
        assert_eq!(
            classify_fallback_reason("invalid number"),
            FallbackReason::PrimaryFailed
        );
        assert_eq!(classify_fallback_reason(""), FallbackReason::PrimaryFailed);
    }

    #[test]
    fn test_primary_strategy_always_uses_primary() {
        let cfg = config(RoutingStrategy::Primary);
        for attempt in 1..=4 {
            assert_eq!(select_provider(&cfg, attempt, costs), "Primary");
        }
    }

    #[test]
    fn test_round_robin_alternates_by_attempt() {
        let cfg = config(RoutingStrategy::RoundRobin);
        let picks: Vec<String> = (1..=4).map(|n| select_provider(&cfg, n, costs)).collect();
        assert_eq!(picks, vec!["Primary", "Backup", "Primary", "Backup"]);

        let mut no_fallback = config(RoutingStrategy::RoundRobin);
        no_fallback.fallback_provider = None;
        assert_eq!(select_provider(&no_fallback, 2, costs), "Primary");
    }

    #[test]
    fn test_cost_based_picks_cheapest_under_threshold() {
        let mut cfg = config(RoutingStrategy::CostBased);
        assert_eq!(select_provider(&cfg, 1, costs), "Backup");

        cfg.cost_threshold = Some(0.005);
        assert_eq!(select_provider(&cfg, 1, costs), "Primary");

        cfg.cost_threshold = Some(0.015);
        assert_eq!(select_provider(&cfg, 1, costs), "Backup");

        // Sin estimaciones conocidas se queda con el primario
        assert_eq!(select_provider(&cfg, 1, |_| None), "Primary");
    }

    #[test]
    fn test_alternate_provider() {
        let cfg = config(RoutingStrategy::Primary);
        assert_eq!(alternate_provider(&cfg, "Primary"), Some("Backup"));
        assert_eq!(alternate_provider(&cfg, "Backup"), Some("Primary"));

        let mut blank = config(RoutingStrategy::Primary);
        blank.fallback_provider = Some("  ".to_string());
        assert_eq!(alternate_provider(&blank, "Primary"), None);
    }

    #[test]
    fn test_default_provider_names() {
        assert_eq!(default_provider_name(ChannelType::Sms), "MockSMSProvider");
        assert_eq!(default_provider_name(ChannelType::Mms), "MockMMSProvider");
        assert_eq!(default_provider_name(ChannelType::Email), "MockEmailProvider");
    }
}
