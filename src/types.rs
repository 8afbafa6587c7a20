/// Customer identifier taken verbatim from the purchases log.
/// Examples: `1041`, `c-00731`
pub type UserId = String;
/// External item identifier, kept as text to preserve leading zeros.
/// Examples: `000412`, `artwork-77`
pub type ItemId = String;
/// Dense zero-based item index produced by an `IdentifierIndex`.
///
/// Signed so remapped artifacts share the integer type used by the list codec.
pub type ItemIndex = i64;
/// Seconds since the Unix epoch (UTC).
/// Example: `1577836800` for `2020-01-01 00:00:00`
pub type Timestamp = i64;
/// Name of a column in a raw log or persisted artifact.
/// Examples: `upload_date`, `item_id`, `profile`
pub type ColumnName = String;
