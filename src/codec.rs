//! Text codec for list-valued columns of persisted evaluation scenarios.
//!
//! Lists are rendered as `[1, 2, 3]`. Decoding accepts cells that are still
//! text as well as cells that were already decoded, so running it twice is a
//! no-op.

use serde::{Deserialize, Serialize};

use crate::constants::codec::{LIST_CLOSE, LIST_OPEN, LIST_SEPARATOR};
use crate::constants::columns::{PREDICT, PROFILE, SHOPPING_CART, USER_ID};
use crate::data::{HoldoutTable, ItemColumn};
use crate::errors::PrepError;
use crate::types::{ItemIndex, Timestamp, UserId};

/// One list-valued cell, either still in its textual form or decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListCell {
    /// Bracketed, comma-separated text as read from disk.
    Encoded(String),
    /// Native integer list.
    Decoded(Vec<ItemIndex>),
}

impl ListCell {
    /// Decode a textual cell; decoded cells pass through unchanged.
    pub fn decode(self) -> Result<Self, PrepError> {
        match self {
            Self::Encoded(raw) => decode_list(&raw).map(Self::Decoded),
            decoded @ Self::Decoded(_) => Ok(decoded),
        }
    }

    /// Render a decoded cell as text; textual cells pass through unchanged.
    pub fn encode(self) -> Self {
        match self {
            Self::Decoded(values) => Self::Encoded(encode_list(&values)),
            encoded @ Self::Encoded(_) => encoded,
        }
    }

    /// The decoded values, if this cell has been decoded.
    pub fn values(&self) -> Option<&[ItemIndex]> {
        match self {
            Self::Decoded(values) => Some(values),
            Self::Encoded(_) => None,
        }
    }

    /// Decode if needed and return the owned values.
    pub fn into_values(self) -> Result<Vec<ItemIndex>, PrepError> {
        match self {
            Self::Decoded(values) => Ok(values),
            Self::Encoded(raw) => decode_list(&raw),
        }
    }

    /// Textual form of the cell regardless of its current state.
    pub fn to_text(&self) -> String {
        match self {
            Self::Encoded(raw) => raw.clone(),
            Self::Decoded(values) => encode_list(values),
        }
    }
}

impl From<Vec<ItemIndex>> for ListCell {
    fn from(values: Vec<ItemIndex>) -> Self {
        Self::Decoded(values)
    }
}

/// Render integers as `[a, b, c]`.
pub fn encode_list(values: &[ItemIndex]) -> String {
    let body = values
        .iter()
        .map(ItemIndex::to_string)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR);
    format!("{LIST_OPEN}{body}{LIST_CLOSE}")
}

/// Parse `[a, b, c]` back into integers.
///
/// Enclosing brackets are stripped and the body is split on `", "`. An empty
/// body (`[]`) is an empty list and a bare integer (`7`) is a one-element list.
pub fn decode_list(raw: &str) -> Result<Vec<ItemIndex>, PrepError> {
    let body = raw.trim_matches(|c: char| c == LIST_OPEN || c == LIST_CLOSE);
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    body.split(LIST_SEPARATOR)
        .map(|token| {
            token
                .trim()
                .parse::<ItemIndex>()
                .map_err(|err| PrepError::Format {
                    value: raw.to_string(),
                    reason: format!("token '{token}' is not an integer: {err}"),
                })
        })
        .collect()
}

/// Persisted evaluation scenarios with list-valued columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTable {
    pub timestamp: Vec<Timestamp>,
    /// Absent when scenarios were written straight from a holdout table.
    pub shopping_cart: Option<Vec<ListCell>>,
    pub profile: Vec<ListCell>,
    pub predict: Vec<ListCell>,
    pub user_id: Vec<UserId>,
}

impl EvaluationTable {
    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    /// True when the table holds no scenarios.
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    /// Verify that every present column has one value per scenario.
    pub fn check_lengths(&self) -> Result<(), PrepError> {
        let rows = self.len();
        let mut columns = vec![
            (PROFILE, self.profile.len()),
            (PREDICT, self.predict.len()),
            (USER_ID, self.user_id.len()),
        ];
        if let Some(cart) = &self.shopping_cart {
            columns.push((SHOPPING_CART, cart.len()));
        }
        for (name, len) in columns {
            if len != rows {
                return Err(PrepError::Schema(format!(
                    "column '{name}' has {len} values but the table has {rows} rows"
                )));
            }
        }
        Ok(())
    }

    /// Decode every textual cell of `shopping_cart`, `profile`, and `predict`.
    ///
    /// Fails on the first cell whose tokens are not all integers.
    pub fn decode(self) -> Result<Self, PrepError> {
        let decode_all = |cells: Vec<ListCell>| {
            cells
                .into_iter()
                .map(ListCell::decode)
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            timestamp: self.timestamp,
            shopping_cart: self.shopping_cart.map(decode_all).transpose()?,
            profile: decode_all(self.profile)?,
            predict: decode_all(self.predict)?,
            user_id: self.user_id,
        })
    }

    /// Render every decoded list cell back to text.
    pub fn encode(self) -> Self {
        let encode_all =
            |cells: Vec<ListCell>| cells.into_iter().map(ListCell::encode).collect::<Vec<_>>();
        Self {
            timestamp: self.timestamp,
            shopping_cart: self.shopping_cart.map(encode_all),
            profile: encode_all(self.profile),
            predict: encode_all(self.predict),
            user_id: self.user_id,
        }
    }
}

impl HoldoutTable<ItemIndex> {
    /// Lay out remapped scenarios in the persisted evaluation format.
    pub fn into_evaluation_table(self) -> EvaluationTable {
        let predict = match self.predict {
            ItemColumn::Scalar(values) => values
                .into_iter()
                .map(|value| ListCell::Decoded(vec![value]))
                .collect(),
            ItemColumn::Listed(baskets) => baskets.into_iter().map(ListCell::Decoded).collect(),
        };
        EvaluationTable {
            timestamp: self.timestamp,
            shopping_cart: None,
            profile: self.profile.into_iter().map(ListCell::Decoded).collect(),
            predict,
            user_id: self.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_decodes_bracketed_lists() {
        assert_eq!(encode_list(&[1, 2, 3]), "[1, 2, 3]");
        assert_eq!(decode_list("[1, 2, 3]").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode_list(&encode_list(&[1, 2, 3])).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_and_bare_cells_decode() {
        assert_eq!(encode_list(&[]), "[]");
        assert!(decode_list("[]").unwrap().is_empty());
        assert_eq!(decode_list("7").unwrap(), vec![7]);
        assert_eq!(decode_list("[42]").unwrap(), vec![42]);
    }

    #[test]
    fn non_integer_tokens_are_format_errors() {
        for raw in ["[1, x, 3]", "[1,2]", "[1.5]", "[a]"] {
            match decode_list(raw) {
                Err(PrepError::Format { value, .. }) => assert_eq!(value, raw),
                other => panic!("expected format error for '{raw}', got {other:?}"),
            }
        }
    }

    #[test]
    fn decoding_native_cells_is_a_no_op() {
        let cell = ListCell::Decoded(vec![4, 5]);
        assert_eq!(cell.clone().decode().unwrap(), cell);
        let text = ListCell::Encoded("[4, 5]".to_string());
        assert_eq!(text.clone().decode().unwrap(), cell);
        assert_eq!(cell.clone().encode(), text);
        assert_eq!(cell.to_text(), "[4, 5]");
        assert_eq!(text.values(), None);
    }

    #[test]
    fn table_decode_is_idempotent() {
        let table = EvaluationTable {
            timestamp: vec![10, 20],
            shopping_cart: Some(vec![
                ListCell::Encoded("[9]".into()),
                ListCell::Decoded(vec![8]),
            ]),
            profile: vec![
                ListCell::Encoded("[1, 2]".into()),
                ListCell::Encoded("[]".into()),
            ],
            predict: vec![ListCell::Encoded("[3]".into()), ListCell::Decoded(vec![4])],
            user_id: vec!["u1".into(), "u2".into()],
        };
        let once = table.clone().decode().unwrap();
        let twice = once.clone().decode().unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.profile[0].values(), Some(&[1, 2][..]));
        assert_eq!(once.profile[1].values(), Some(&[][..]));
        assert_eq!(once.shopping_cart.as_ref().unwrap()[1].values(), Some(&[8][..]));

        let round_trip = once.clone().encode().decode().unwrap();
        assert_eq!(round_trip, once);
    }

    #[test]
    fn table_decode_reports_the_bad_cell() {
        let table = EvaluationTable {
            timestamp: vec![1],
            shopping_cart: None,
            profile: vec![ListCell::Encoded("[1, 2]".into())],
            predict: vec![ListCell::Encoded("[oops]".into())],
            user_id: vec!["u".into()],
        };
        let err = table.decode().unwrap_err();
        assert!(err.to_string().contains("[oops]"));
    }

    #[test]
    fn holdout_tables_render_scalar_predictions_as_single_lists() {
        let holdout = HoldoutTable {
            timestamp: vec![5],
            profile: vec![vec![0, 1]],
            predict: ItemColumn::Scalar(vec![2]),
            user_id: vec!["u".to_string()],
        };
        let table = holdout.into_evaluation_table();
        assert!(table.check_lengths().is_ok());
        assert_eq!(table.predict[0].values(), Some(&[2][..]));
        assert_eq!(table.profile[0].to_text(), "[0, 1]");
        assert!(table.shopping_cart.is_none());
    }
}
