use serde::{Deserialize, Serialize};

use crate::constants::raw::{
    INVENTORY_ITEM_FIELD, INVENTORY_TIMESTAMP_FIELD, PURCHASES_ITEM_FIELD,
    PURCHASES_TIMESTAMP_FIELD, PURCHASES_USER_FIELD,
};
use crate::constants::splits::DEFAULT_THRESHOLD;
use crate::errors::PrepError;
use crate::types::ColumnName;

/// Raw field names of the inventory (item additions) log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySchema {
    /// Field holding the item identifier (renamed to `item_id`).
    pub item_field: ColumnName,
    /// Field holding the upload timestamp text (renamed to `timestamp`).
    pub timestamp_field: ColumnName,
}

impl Default for InventorySchema {
    fn default() -> Self {
        Self {
            item_field: INVENTORY_ITEM_FIELD.to_string(),
            timestamp_field: INVENTORY_TIMESTAMP_FIELD.to_string(),
        }
    }
}

/// Raw field names of the purchases log (one row per item per basket).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchasesSchema {
    /// Field holding the item identifier (renamed to `item_id`).
    pub item_field: ColumnName,
    /// Field holding the customer identifier (renamed to `user_id`).
    pub user_field: ColumnName,
    /// Field holding the order timestamp text (renamed to `timestamp`).
    pub timestamp_field: ColumnName,
}

impl Default for PurchasesSchema {
    fn default() -> Self {
        Self {
            item_field: PURCHASES_ITEM_FIELD.to_string(),
            user_field: PURCHASES_USER_FIELD.to_string(),
            timestamp_field: PURCHASES_TIMESTAMP_FIELD.to_string(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Number of trailing rows per user held out for evaluation.
    ///
    /// Users with `threshold` rows or fewer are kept entirely in training.
    pub threshold: usize,
    /// Log per-column distinct counts after ingestion. Has no effect on output.
    pub display_stats: bool,
    /// Inventory log field names.
    pub inventory: InventorySchema,
    /// Purchases log field names.
    pub purchases: PurchasesSchema,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            display_stats: false,
            inventory: InventorySchema::default(),
            purchases: PurchasesSchema::default(),
        }
    }
}

impl PrepConfig {
    /// Reject configurations the splitter cannot honor.
    pub fn validated(self) -> Result<Self, PrepError> {
        if self.threshold == 0 {
            return Err(PrepError::Configuration(
                "evaluation threshold must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_raw_log_layout() {
        let config = PrepConfig::default();
        assert_eq!(config.threshold, 1);
        assert!(!config.display_stats);
        assert_eq!(config.inventory.item_field, "id");
        assert_eq!(config.inventory.timestamp_field, "upload_date");
        assert_eq!(config.purchases.item_field, "artwork_id");
        assert_eq!(config.purchases.user_field, "customer_id");
        assert_eq!(config.purchases.timestamp_field, "order_date");
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = PrepConfig {
            threshold: 0,
            ..PrepConfig::default()
        };
        assert!(matches!(
            config.validated(),
            Err(PrepError::Configuration(_))
        ));
        assert!(PrepConfig::default().validated().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: PrepConfig = serde_json::from_str(r#"{"threshold": 3}"#).unwrap();
        assert_eq!(config.threshold, 3);
        assert_eq!(config.purchases, PurchasesSchema::default());
    }

    #[test]
    fn partial_nested_schemas_fall_back_to_defaults() {
        let config: PrepConfig = serde_json::from_str(
            r#"{"inventory": {"item_field": "artwork"}, "purchases": {"user_field": "buyer"}}"#,
        )
        .unwrap();
        assert_eq!(config.inventory.item_field, "artwork");
        assert_eq!(config.inventory.timestamp_field, "upload_date");
        assert_eq!(config.purchases.user_field, "buyer");
        assert_eq!(config.purchases.item_field, "artwork_id");
        assert_eq!(config.purchases.timestamp_field, "order_date");
    }
}
