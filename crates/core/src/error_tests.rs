use super::*;

#[test]
fn only_transient_is_retryable() {
    assert!(!ActivityError::Validation("bad".into()).is_retryable());
    assert!(!ActivityError::NotFound("ACME-1".into()).is_retryable());
    assert!(!ActivityError::Conflict("stale".into()).is_retryable());
    assert!(ActivityError::Transient(anyhow::anyhow!("timeout")).is_retryable());
}

#[test]
fn default_retry_policy_matches_spec_numbers() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.initial_interval, Duration::from_secs(2));
    assert_eq!(policy.backoff_coefficient, 2.0);
    assert_eq!(policy.max_interval, Duration::from_secs(60));
    assert_eq!(policy.max_attempts, 5);
}

#[test]
fn delay_doubles_then_caps_at_max_interval() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
    assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(8));
    assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(16));
    assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(32));
    assert_eq!(policy.delay_for_attempt(6), Duration::from_secs(60));
    assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(60));
}
