use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use crate::codec::{EvaluationTable, ListCell, encode_list};
use crate::config::{InventorySchema, PurchasesSchema};
use crate::constants::columns::{
    EVALUATION, ITEM_ID, N_BASKETS, N_ITEMS, PREDICT, PROFILE, SHOPPING_CART, TIMESTAMP, USER_ID,
};
use crate::data::{InteractionTable, ItemColumn};
use crate::errors::PrepError;
use crate::ingestion::{InventoryRow, PurchaseRow};
use crate::types::{ItemIndex, Timestamp};

/// Read inventory rows from a CSV file; extra columns are ignored.
pub fn read_inventory_csv(
    path: impl AsRef<Path>,
    schema: &InventorySchema,
) -> Result<Vec<InventoryRow>, PrepError> {
    let rows = read_inventory(File::open(path.as_ref())?, schema)?;
    debug!(path = %path.as_ref().display(), rows = rows.len(), "read inventory log");
    Ok(rows)
}

/// Read inventory rows from any CSV reader. Every field is kept as text.
pub fn read_inventory<R: Read>(
    reader: R,
    schema: &InventorySchema,
) -> Result<Vec<InventoryRow>, PrepError> {
    let mut reader = ReaderBuilder::new().from_reader(reader);
    let headers = reader.headers()?.clone();
    let item = column_position(&headers, &schema.item_field)?;
    let timestamp = column_position(&headers, &schema.timestamp_field)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(InventoryRow {
            item_id: field(&record, item).to_string(),
            timestamp: field(&record, timestamp).to_string(),
        });
    }
    Ok(rows)
}

/// Read purchase rows from a CSV file; extra columns are ignored.
pub fn read_purchases_csv(
    path: impl AsRef<Path>,
    schema: &PurchasesSchema,
) -> Result<Vec<PurchaseRow>, PrepError> {
    let rows = read_purchases(File::open(path.as_ref())?, schema)?;
    debug!(path = %path.as_ref().display(), rows = rows.len(), "read purchases log");
    Ok(rows)
}

/// Read purchase rows from any CSV reader. Every field is kept as text.
pub fn read_purchases<R: Read>(
    reader: R,
    schema: &PurchasesSchema,
) -> Result<Vec<PurchaseRow>, PrepError> {
    let mut reader = ReaderBuilder::new().from_reader(reader);
    let headers = reader.headers()?.clone();
    let item = column_position(&headers, &schema.item_field)?;
    let user = column_position(&headers, &schema.user_field)?;
    let timestamp = column_position(&headers, &schema.timestamp_field)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(PurchaseRow {
            item_id: field(&record, item).to_string(),
            user_id: field(&record, user).to_string(),
            timestamp: field(&record, timestamp).to_string(),
        });
    }
    Ok(rows)
}

/// Write a remapped interaction table to a CSV file, creating parent dirs.
pub fn write_interactions_csv(
    path: impl AsRef<Path>,
    table: &InteractionTable<ItemIndex>,
) -> Result<(), PrepError> {
    let file = create_with_parents(path.as_ref())?;
    write_interactions(file, table)?;
    debug!(path = %path.as_ref().display(), rows = table.len(), "wrote interactions");
    Ok(())
}

/// Write a remapped interaction table as CSV.
///
/// Columns: `timestamp,user_id,item_id` followed by whichever of `n_baskets`,
/// `n_items`, `evaluation` are present. Basket cells use the `[a, b]` form.
pub fn write_interactions<W: Write>(
    writer: W,
    table: &InteractionTable<ItemIndex>,
) -> Result<(), PrepError> {
    table.check_lengths()?;
    let mut writer = WriterBuilder::new().from_writer(writer);
    let mut header = vec![TIMESTAMP];
    if table.user_id.is_some() {
        header.push(USER_ID);
    }
    header.push(ITEM_ID);
    if table.n_baskets.is_some() {
        header.push(N_BASKETS);
    }
    if table.n_items.is_some() {
        header.push(N_ITEMS);
    }
    if table.evaluation.is_some() {
        header.push(EVALUATION);
    }
    writer.write_record(&header)?;

    for idx in 0..table.len() {
        let mut record = vec![table.timestamp[idx].to_string()];
        if let Some(users) = &table.user_id {
            record.push(users[idx].clone());
        }
        record.push(match &table.item_id {
            ItemColumn::Scalar(values) => values[idx].to_string(),
            ItemColumn::Listed(baskets) => encode_list(&baskets[idx]),
        });
        if let Some(counts) = &table.n_baskets {
            record.push(counts[idx].to_string());
        }
        if let Some(counts) = &table.n_items {
            record.push(counts[idx].to_string());
        }
        if let Some(flags) = &table.evaluation {
            record.push(flags[idx].to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write evaluation scenarios to a CSV file, creating parent dirs.
pub fn write_evaluation_csv(
    path: impl AsRef<Path>,
    table: &EvaluationTable,
) -> Result<(), PrepError> {
    let file = create_with_parents(path.as_ref())?;
    write_evaluation(file, table)?;
    debug!(path = %path.as_ref().display(), scenarios = table.len(), "wrote evaluation scenarios");
    Ok(())
}

/// Write evaluation scenarios as CSV with list cells in `[a, b]` form.
pub fn write_evaluation<W: Write>(writer: W, table: &EvaluationTable) -> Result<(), PrepError> {
    table.check_lengths()?;
    let mut writer = WriterBuilder::new().from_writer(writer);
    let mut header = vec![TIMESTAMP];
    if table.shopping_cart.is_some() {
        header.push(SHOPPING_CART);
    }
    header.extend([PROFILE, PREDICT, USER_ID]);
    writer.write_record(&header)?;

    for idx in 0..table.len() {
        let mut record = vec![table.timestamp[idx].to_string()];
        if let Some(cart) = &table.shopping_cart {
            record.push(cart[idx].to_text());
        }
        record.push(table.profile[idx].to_text());
        record.push(table.predict[idx].to_text());
        record.push(table.user_id[idx].clone());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read evaluation scenarios from a CSV file. List cells stay textual.
pub fn read_evaluation_csv(path: impl AsRef<Path>) -> Result<EvaluationTable, PrepError> {
    read_evaluation(File::open(path.as_ref())?)
}

/// Read evaluation scenarios from any CSV reader. List cells stay textual.
///
/// `shopping_cart` is optional; the other columns are required. Columns
/// outside the evaluation layout (such as a leading row index) are ignored.
pub fn read_evaluation<R: Read>(reader: R) -> Result<EvaluationTable, PrepError> {
    let mut reader = ReaderBuilder::new().from_reader(reader);
    let headers = reader.headers()?.clone();
    let timestamp = column_position(&headers, TIMESTAMP)?;
    let cart = headers.iter().position(|name| name == SHOPPING_CART);
    let profile = column_position(&headers, PROFILE)?;
    let predict = column_position(&headers, PREDICT)?;
    let user = column_position(&headers, USER_ID)?;

    let mut table = EvaluationTable {
        timestamp: Vec::new(),
        shopping_cart: cart.map(|_| Vec::new()),
        profile: Vec::new(),
        predict: Vec::new(),
        user_id: Vec::new(),
    };
    for record in reader.records() {
        let record = record?;
        table.timestamp.push(parse_epoch(field(&record, timestamp))?);
        if let (Some(cells), Some(pos)) = (table.shopping_cart.as_mut(), cart) {
            cells.push(ListCell::Encoded(field(&record, pos).to_string()));
        }
        table
            .profile
            .push(ListCell::Encoded(field(&record, profile).to_string()));
        table
            .predict
            .push(ListCell::Encoded(field(&record, predict).to_string()));
        table.user_id.push(field(&record, user).to_string());
    }
    Ok(table)
}

/// Read an evaluation CSV and decode its list-valued columns.
pub fn get_evaluation_table(path: impl AsRef<Path>) -> Result<EvaluationTable, PrepError> {
    read_evaluation_csv(path)?.decode()
}

fn column_position(headers: &StringRecord, name: &str) -> Result<usize, PrepError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| {
            PrepError::Schema(format!(
                "expected column '{name}' is absent (found: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
}

// Short rows are rejected by the csv reader, so positions are always in range.
fn field(record: &StringRecord, pos: usize) -> &str {
    record.get(pos).unwrap_or_default()
}

fn parse_epoch(raw: &str) -> Result<Timestamp, PrepError> {
    raw.trim().parse::<Timestamp>().map_err(|err| PrepError::Parse {
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

fn create_with_parents(path: &Path) -> Result<File, PrepError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}
