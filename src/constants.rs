/// Canonical column names shared by every table in the pipeline.
pub mod columns {
    /// Epoch-second timestamp column.
    pub const TIMESTAMP: &str = "timestamp";
    /// User (customer) identifier column.
    pub const USER_ID: &str = "user_id";
    /// Item identifier column (scalar or basket-valued).
    pub const ITEM_ID: &str = "item_id";
    /// Per-user interaction row count.
    pub const N_BASKETS: &str = "n_baskets";
    /// Per-row basket size.
    pub const N_ITEMS: &str = "n_items";
    /// Evaluation flag added by the splitter.
    pub const EVALUATION: &str = "evaluation";
    /// Flattened training items of a holdout scenario.
    pub const PROFILE: &str = "profile";
    /// Target items of a holdout scenario.
    pub const PREDICT: &str = "predict";
    /// Optional in-session cart context of an evaluation scenario.
    pub const SHOPPING_CART: &str = "shopping_cart";
}

/// Field names used by the raw transaction logs.
pub mod raw {
    /// Inventory item identifier field.
    pub const INVENTORY_ITEM_FIELD: &str = "id";
    /// Inventory upload timestamp field.
    pub const INVENTORY_TIMESTAMP_FIELD: &str = "upload_date";
    /// Purchases item identifier field.
    pub const PURCHASES_ITEM_FIELD: &str = "artwork_id";
    /// Purchases customer identifier field.
    pub const PURCHASES_USER_FIELD: &str = "customer_id";
    /// Purchases order timestamp field.
    pub const PURCHASES_TIMESTAMP_FIELD: &str = "order_date";
}

/// Constants used by timestamp parsing.
pub mod time {
    /// Only this many leading characters of a raw timestamp are parsed.
    pub const TIMESTAMP_PREFIX_LEN: usize = 19;
    /// `chrono` format for the truncated timestamp prefix.
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
}

/// Constants used by the evaluation split.
pub mod splits {
    /// Leave-one-out by default.
    pub const DEFAULT_THRESHOLD: usize = 1;
}

/// Constants used by the textual list codec.
pub mod codec {
    /// Opening bracket of a rendered list.
    pub const LIST_OPEN: char = '[';
    /// Closing bracket of a rendered list.
    pub const LIST_CLOSE: char = ']';
    /// Separator between rendered list elements.
    pub const LIST_SEPARATOR: &str = ", ";
}

/// Default artifact file names written by the `prepare_holdouts` binary.
pub mod artifacts {
    /// Residual training interactions.
    pub const TRAIN_FILENAME: &str = "train.csv";
    /// Holdout evaluation scenarios.
    pub const HOLDOUT_FILENAME: &str = "holdout.csv";
    /// Identifier index written when none was supplied.
    pub const INDEX_FILENAME: &str = "id2index.json";
}
