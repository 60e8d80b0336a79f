//! Bulk catalog import from CSV uploads.
//!
//! Rows succeed or fail independently; one bad row never aborts the batch.
//! Row numbers in the outcome are 1-indexed over the whole file, so with the
//! header on row 1 the first data row reports as row 2.

use serde::Serialize;
use sqlx::SqlitePool;

use sapling_core::Season;

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::models::NewProduct;

/// A row that imported successfully.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRow {
    pub row: usize,
    pub id: i64,
    pub name: String,
}

/// A row that was rejected, with the reason.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    pub row: usize,
    pub name: String,
    pub error: String,
}

/// Outcome of a bulk import: per-row accounting for partial success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub processed: usize,
    pub succeeded: Vec<ImportedRow>,
    pub failed: Vec<FailedRow>,
}

#[derive(Debug)]
struct ParsedRow {
    product: NewProduct,
    category_name: Option<String>,
}

fn field<'r>(headers: &csv::StringRecord, record: &'r csv::StringRecord, name: &str) -> &'r str {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .unwrap_or("")
}

fn parse_row(
    headers: &csv::StringRecord,
    record: &csv::StringRecord,
) -> Result<ParsedRow, String> {
    let name = field(headers, record, "name");
    if name.is_empty() {
        return Err("Missing required field: name".to_owned());
    }

    let price_raw = field(headers, record, "price");
    if price_raw.is_empty() {
        return Err("Missing required field: price".to_owned());
    }
    let price: f64 = price_raw
        .parse()
        .map_err(|_| format!("Invalid price: {price_raw}"))?;
    // is_finite first: NaN fails every comparison, so `< 0.0` alone would
    // let it through.
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Invalid price: {price_raw}"));
    }

    let season =
        Season::parse_set(field(headers, record, "season")).map_err(|e| e.to_string())?;

    // Absent or blank means available; only after that does the value matter.
    let availability_raw = field(headers, record, "availability");
    let availability = availability_raw.is_empty()
        || availability_raw.eq_ignore_ascii_case("true")
        || availability_raw == "1";

    let rating: f64 = field(headers, record, "rating")
        .parse()
        .ok()
        .filter(|r: &f64| r.is_finite())
        .unwrap_or(0.0);
    let reviews: i64 = field(headers, record, "reviews").parse().unwrap_or(0);

    let category_raw = field(headers, record, "category");
    let category_name = if category_raw.is_empty() {
        None
    } else {
        Some(category_raw.to_owned())
    };

    Ok(ParsedRow {
        product: NewProduct {
            name: name.to_owned(),
            price,
            description: field(headers, record, "description").to_owned(),
            category: String::new(),
            category_id: None,
            image: field(headers, record, "image").to_owned(),
            season,
            availability,
            featured: false,
            rating,
            reviews,
        },
        category_name,
    })
}

/// Import products from CSV bytes.
///
/// # Errors
///
/// Returns `RepositoryError` only for failures outside any single row (a row
/// that the store rejects is recorded in the outcome instead).
pub async fn import_csv(pool: &SqlitePool, bytes: &[u8]) -> Result<ImportOutcome, RepositoryError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader.headers().map(csv::StringRecord::clone).unwrap_or_default();

    let products = ProductRepository::new(pool);
    let categories = CategoryRepository::new(pool);

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let row = index + 2;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                failed.push(FailedRow {
                    row,
                    name: format!("Row {row}"),
                    error: format!("Unreadable row: {e}"),
                });
                continue;
            }
        };

        let name = match field(&headers, &record, "name") {
            "" => format!("Row {row}"),
            name => name.to_owned(),
        };

        let mut parsed = match parse_row(&headers, &record) {
            Ok(parsed) => parsed,
            Err(error) => {
                failed.push(FailedRow { row, name, error });
                continue;
            }
        };

        if let Some(category_name) = parsed.category_name.take() {
            match categories.find_by_name(&category_name).await? {
                Some(category) => {
                    parsed.product.category = category.name;
                    parsed.product.category_id = Some(category.id);
                }
                None => {
                    failed.push(FailedRow {
                        row,
                        name,
                        error: format!("Unknown category: {category_name}"),
                    });
                    continue;
                }
            }
        }

        match products.create(&parsed.product).await {
            Ok(product) => succeeded.push(ImportedRow {
                row,
                id: product.id.as_i64(),
                name: product.name,
            }),
            Err(e) => {
                tracing::warn!(row, error = %e, "Bulk import row rejected by store");
                failed.push(FailedRow {
                    row,
                    name,
                    error: "Could not save product".to_owned(),
                });
            }
        }
    }

    Ok(ImportOutcome {
        processed: succeeded.len() + failed.len(),
        succeeded,
        failed,
    })
}
