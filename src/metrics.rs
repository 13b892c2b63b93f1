use crate::policy::EntityKind;
use crate::store::RowStore;

const TRACKED: [EntityKind; 7] = [
    EntityKind::Users,
    EntityKind::Regions,
    EntityKind::Families,
    EntityKind::AssistanceTypes,
    EntityKind::Inventory,
    EntityKind::Tasks,
    EntityKind::Deliveries,
];

/// Seeds the per-table row gauges. Tables the token cannot count are skipped.
pub async fn init_metrics(store: &dyn RowStore, token: &str) {
    let mut seeded = 0;
    for entity in TRACKED {
        match store.count(token, entity.table(), &[]).await {
            Ok(count) => {
                metrics::gauge!("aidboard_rows_total", "table" => entity.table()).set(count as f64);
                seeded += 1;
            }
            Err(e) => {
                tracing::warn!(table = entity.table(), error = %e, "could not seed row gauge");
            }
        }
    }
    tracing::info!("Initialized metrics: {} of {} tables counted", seeded, TRACKED.len());
}

/// Overwrites gauges with freshly counted totals.
pub fn record_totals(totals: &[(EntityKind, u64)]) {
    for (entity, count) in totals {
        metrics::gauge!("aidboard_rows_total", "table" => entity.table()).set(*count as f64);
    }
}
