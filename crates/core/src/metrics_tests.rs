use super::*;

#[test]
fn merge_accumulates_all_fields() {
    let mut total = OrchestratorMetrics::default();
    total.merge(&OrchestratorMetrics { projects_processed: 2, issues_synced: 10, duration_ms: 500, errors: 1 });
    total.merge(&OrchestratorMetrics { projects_processed: 1, issues_synced: 4, duration_ms: 200, errors: 0 });
    assert_eq!(
        total,
        OrchestratorMetrics { projects_processed: 3, issues_synced: 14, duration_ms: 700, errors: 1 }
    );
}
