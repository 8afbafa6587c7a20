use std::collections::HashSet;
use std::hash::Hash;
use tracing::info;

use crate::constants::columns::{EVALUATION, ITEM_ID, N_BASKETS, N_ITEMS, TIMESTAMP, USER_ID};
use crate::data::InteractionTable;

/// Observational summary of one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSummary {
    pub column: &'static str,
    /// Distinct values (distinct identifiers for basket columns).
    pub distinct: usize,
    /// Mean basket size, reported for basket-valued columns only.
    pub mean_basket_size: Option<f64>,
}

/// Per-column distinct counts, plus mean basket size for basket columns.
pub fn column_stats<T: Hash + Eq>(table: &InteractionTable<T>) -> Vec<ColumnSummary> {
    let mut stats = vec![ColumnSummary {
        column: TIMESTAMP,
        distinct: distinct(table.timestamp.iter()),
        mean_basket_size: None,
    }];
    if let Some(users) = &table.user_id {
        stats.push(ColumnSummary {
            column: USER_ID,
            distinct: distinct(users.iter()),
            mean_basket_size: None,
        });
    }
    let mean_basket_size = table.item_id.is_listed().then(|| {
        let sizes = table.item_id.basket_sizes();
        if sizes.is_empty() {
            0.0
        } else {
            sizes.iter().sum::<usize>() as f64 / sizes.len() as f64
        }
    });
    stats.push(ColumnSummary {
        column: ITEM_ID,
        distinct: distinct(table.item_id.iter_ids()),
        mean_basket_size,
    });
    for (column, values) in [(N_BASKETS, &table.n_baskets), (N_ITEMS, &table.n_items)] {
        if let Some(values) = values {
            stats.push(ColumnSummary {
                column,
                distinct: distinct(values.iter()),
                mean_basket_size: None,
            });
        }
    }
    if let Some(flags) = &table.evaluation {
        stats.push(ColumnSummary {
            column: EVALUATION,
            distinct: distinct(flags.iter()),
            mean_basket_size: None,
        });
    }
    stats
}

/// Log `column_stats` for `table` at info level.
pub fn log_column_stats<T: Hash + Eq>(label: &str, table: &InteractionTable<T>) {
    for summary in column_stats(table) {
        match summary.mean_basket_size {
            Some(mean) => info!(
                "{label} - {}: {} distinct, mean basket size {mean:.3}",
                summary.column, summary.distinct
            ),
            None => info!("{label} - {}: {}", summary.column, summary.distinct),
        }
    }
}

fn distinct<'a, V, I>(values: I) -> usize
where
    V: Hash + Eq + 'a,
    I: Iterator<Item = &'a V>,
{
    values.collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ItemColumn;

    #[test]
    fn basket_columns_report_mean_size() {
        let table: InteractionTable = InteractionTable::new(
            vec![1, 1, 2],
            Some(vec!["u1".into(), "u2".into(), "u1".into()]),
            ItemColumn::Listed(vec![
                vec!["a".into(), "b".into()],
                vec!["a".into()],
                vec!["c".into(), "d".into(), "a".into()],
            ]),
        )
        .unwrap();
        let stats = column_stats(&table);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].column, "timestamp");
        assert_eq!(stats[0].distinct, 2);
        assert_eq!(stats[1].distinct, 2);
        assert_eq!(stats[2].distinct, 4);
        assert!((stats[2].mean_basket_size.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn scalar_columns_report_distinct_only() {
        let table: InteractionTable = InteractionTable::new(
            vec![5, 6],
            None,
            ItemColumn::Scalar(vec!["a".into(), "a".into()]),
        )
        .unwrap();
        let stats = column_stats(&table);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].column, "item_id");
        assert_eq!(stats[1].distinct, 1);
        assert_eq!(stats[1].mean_basket_size, None);
    }
}
