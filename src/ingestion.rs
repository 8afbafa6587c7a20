use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::config::PrepConfig;
use crate::data::{InteractionTable, ItemColumn};
use crate::errors::PrepError;
use crate::metrics::log_column_stats;
use crate::transport::fs::{read_inventory_csv, read_purchases_csv};
use crate::types::{ItemId, Timestamp, UserId};
use crate::utils::parse_timestamp;

/// One raw inventory row restricted to the canonical fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryRow {
    pub item_id: ItemId,
    /// Upload timestamp text as found in the log.
    pub timestamp: String,
}

/// One raw purchase row: a single item of a basket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseRow {
    pub item_id: ItemId,
    pub user_id: UserId,
    /// Order timestamp text as found in the log.
    pub timestamp: String,
}

/// Normalize inventory additions into a scalar-valued canonical table.
///
/// Rows are sorted by timestamp; ties keep their log order.
pub fn ingest_inventory<I>(rows: I) -> Result<InteractionTable, PrepError>
where
    I: IntoIterator<Item = InventoryRow>,
{
    let mut timestamps = Vec::new();
    let mut items = Vec::new();
    for row in rows {
        timestamps.push(parse_timestamp(&row.timestamp)?);
        items.push(row.item_id);
    }
    let table = InteractionTable::new(timestamps, None, ItemColumn::Scalar(items))?;
    debug!(rows = table.len(), "ingested inventory additions");
    Ok(table.sort_by_timestamp())
}

/// Normalize purchases into one basket-valued row per `(timestamp, user_id)`.
///
/// Items bought by the same user in the same second collapse into one basket
/// in log order. Baskets are ordered by timestamp, then user id.
pub fn ingest_purchases<I>(rows: I) -> Result<InteractionTable, PrepError>
where
    I: IntoIterator<Item = PurchaseRow>,
{
    let mut baskets: BTreeMap<(Timestamp, UserId), Vec<ItemId>> = BTreeMap::new();
    let mut raw_rows = 0usize;
    for row in rows {
        let timestamp = parse_timestamp(&row.timestamp)?;
        baskets
            .entry((timestamp, row.user_id))
            .or_default()
            .push(row.item_id);
        raw_rows += 1;
    }

    let mut timestamps = Vec::with_capacity(baskets.len());
    let mut users = Vec::with_capacity(baskets.len());
    let mut items = Vec::with_capacity(baskets.len());
    for ((timestamp, user_id), basket) in baskets {
        timestamps.push(timestamp);
        users.push(user_id);
        items.push(basket);
    }
    let table = InteractionTable::new(timestamps, Some(users), ItemColumn::Listed(items))?;
    debug!(raw_rows, baskets = table.len(), "ingested purchase baskets");
    Ok(table.sort_by_timestamp())
}

/// Read both raw logs and return `(inventory, purchases)` canonical tables.
///
/// With `config.display_stats`, per-column statistics of both tables are
/// logged at info level; the returned tables are unaffected.
pub fn get_transactions(
    inventory_path: impl AsRef<Path>,
    purchases_path: impl AsRef<Path>,
    config: &PrepConfig,
) -> Result<(InteractionTable, InteractionTable), PrepError> {
    let inventory = ingest_inventory(read_inventory_csv(inventory_path, &config.inventory)?)?;
    let purchases = ingest_purchases(read_purchases_csv(purchases_path, &config.purchases)?)?;
    if config.display_stats {
        log_column_stats("inventory", &inventory);
        log_column_stats("purchases", &purchases);
    }
    Ok((inventory, purchases))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(item: &str, user: &str, ts: &str) -> PurchaseRow {
        PurchaseRow {
            item_id: item.to_string(),
            user_id: user.to_string(),
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn purchases_group_into_baskets_per_second_and_user() {
        let table = ingest_purchases(vec![
            purchase("x1", "A", "1970-01-01 00:01:40"),
            purchase("x2", "A", "1970-01-01 00:01:40.250"),
            purchase("x3", "A", "1970-01-01 00:03:20"),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.timestamp, vec![100, 200]);
        assert_eq!(
            table.item_id,
            ItemColumn::Listed(vec![
                vec!["x1".to_string(), "x2".to_string()],
                vec!["x3".to_string()],
            ])
        );
        assert_eq!(table.user_ids().unwrap(), &["A".to_string(), "A".to_string()]);
    }

    #[test]
    fn baskets_keep_log_order_and_split_by_user() {
        let table = ingest_purchases(vec![
            purchase("late", "B", "2020-01-02 00:00:00"),
            purchase("b2", "B", "2020-01-01 00:00:00"),
            purchase("a1", "A", "2020-01-01 00:00:00"),
            purchase("b1", "B", "2020-01-01 00:00:00"),
        ])
        .unwrap();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].user_id, Some("A"));
        assert_eq!(rows[1].user_id, Some("B"));
        assert_eq!(rows[1].items, &["b2".to_string(), "b1".to_string()]);
        assert_eq!(rows[2].items, &["late".to_string()]);
    }

    #[test]
    fn inventory_is_scalar_sorted_and_keeps_leading_zeros() {
        let table = ingest_inventory(vec![
            InventoryRow {
                item_id: "0042".into(),
                timestamp: "2020-01-03 00:00:00".into(),
            },
            InventoryRow {
                item_id: "0007".into(),
                timestamp: "2020-01-01 00:00:00+00".into(),
            },
            InventoryRow {
                item_id: "0100".into(),
                timestamp: "2020-01-03 00:00:00".into(),
            },
        ])
        .unwrap();
        assert!(table.user_id.is_none());
        assert_eq!(
            table.item_id,
            ItemColumn::Scalar(vec!["0007".into(), "0042".into(), "0100".into()])
        );
    }

    #[test]
    fn malformed_timestamp_aborts_ingestion() {
        let err = ingest_purchases(vec![
            purchase("x1", "A", "2020-01-01 00:00:00"),
            purchase("x2", "A", "01/02/2020 10:00"),
        ])
        .unwrap_err();
        assert!(matches!(err, PrepError::Parse { value, .. } if value == "01/02/2020 10:00"));
    }

    #[test]
    fn empty_logs_yield_empty_tables() {
        let inventory = ingest_inventory(Vec::new()).unwrap();
        let purchases = ingest_purchases(Vec::new()).unwrap();
        assert!(inventory.is_empty());
        assert!(purchases.is_empty());
        assert!(purchases.item_id.is_listed());
    }
}
