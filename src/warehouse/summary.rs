use duckdb::types::Value;
use duckdb::Connection;
use log::{debug, info};
use serde::{Serialize, Serializer};

use super::store::ingest_db;
use super::table::{render_value, Column, ColumnType, Table};
use super::{DataError, WarehouseError};

pub const SUMMARY_TABLE: &str = "vendor_sales_summary";

/// Rows written to the log after each pipeline step.
const HEAD_ROWS: usize = 5;

const VENDOR_SUMMARY_QUERY: &str = "
WITH
PurchaseSummary AS (
    SELECT
        p.VendorNumber,
        p.VendorName,
        p.Brand,
        p.Description,
        pp.Volume,
        pp.Price AS ActualPrice,
        p.PurchasePrice,
        SUM(p.Quantity) AS TotalPurchaseQuantity,
        SUM(p.Dollars) AS TotalPurchaseDollars
    FROM purchases p
    JOIN purchase_prices pp ON p.Brand = pp.Brand
    WHERE p.PurchasePrice > 0
    GROUP BY p.VendorNumber, p.VendorName, p.Brand, pp.Volume, pp.Price, p.PurchasePrice, p.Description
),
SalesSummary AS (
    SELECT
        VendorNo,
        Brand,
        SUM(SalesDollars) AS TotalSalesDollars,
        SUM(SalesQuantity) AS TotalSalesQuantity,
        SUM(SalesPrice) AS TotalSalesPrice,
        SUM(ExciseTax) AS TotalExciseTax
    FROM sales
    GROUP BY VendorNo, Brand
)
SELECT
    CAST(ps.VendorNumber AS BIGINT),
    CAST(ps.VendorName AS VARCHAR),
    CAST(ps.Brand AS BIGINT),
    CAST(ps.Description AS VARCHAR),
    ps.Volume,
    CAST(ps.PurchasePrice AS DOUBLE),
    CAST(ps.ActualPrice AS DOUBLE),
    CAST(ps.TotalPurchaseQuantity AS DOUBLE),
    CAST(ps.TotalPurchaseDollars AS DOUBLE),
    CAST(ss.TotalSalesQuantity AS DOUBLE),
    CAST(ss.TotalSalesDollars AS DOUBLE),
    CAST(ss.TotalSalesPrice AS DOUBLE),
    CAST(ss.TotalExciseTax AS DOUBLE)
FROM PurchaseSummary ps
LEFT JOIN SalesSummary ss
    ON ps.VendorNumber = ss.VendorNo AND ps.Brand = ss.Brand
ORDER BY
    COALESCE(CAST(ps.TotalPurchaseDollars AS DOUBLE), 0) DESC,
    ps.VendorNumber,
    ps.Brand,
    ps.PurchasePrice,
    ps.ActualPrice,
    ps.Volume,
    ps.Description,
    ps.VendorName
";

fn serialize_value<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&render_value(value))
}

/// One row of the vendor/brand join as the database returns it. Sales-side totals are
/// `None` when the pair has no sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorSummaryRow {
    pub vendor_number: Option<i64>,
    pub vendor_name: Option<String>,
    pub brand: Option<i64>,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_value")]
    pub volume: Value,
    pub purchase_price: Option<f64>,
    pub actual_price: Option<f64>,
    pub total_purchase_quantity: Option<f64>,
    pub total_purchase_dollars: Option<f64>,
    pub total_sales_quantity: Option<f64>,
    pub total_sales_dollars: Option<f64>,
    pub total_sales_price: Option<f64>,
    pub total_excise_tax: Option<f64>,
}

/// Cleaned and enriched row of `vendor_sales_summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorSummary {
    pub vendor_number: i64,
    pub vendor_name: String,
    pub brand: i64,
    pub description: String,
    pub volume: f64,
    pub purchase_price: f64,
    pub actual_price: f64,
    pub total_purchase_quantity: f64,
    pub total_purchase_dollars: f64,
    pub total_sales_quantity: f64,
    pub total_sales_dollars: f64,
    pub total_sales_price: f64,
    pub total_excise_tax: f64,
    pub gross_profit: f64,
    pub sales_to_purchase_ratio: f64,
    pub stock_turnover: f64,
    pub profit_margin: f64,
}

pub fn create_vendor_summary(conn: &Connection) -> Result<Vec<VendorSummaryRow>, WarehouseError> {
    let mut stmt = conn.prepare(VENDOR_SUMMARY_QUERY)?;
    let rows = stmt.query_map([], |row| {
        Ok(VendorSummaryRow {
            vendor_number: row.get(0)?,
            vendor_name: row.get(1)?,
            brand: row.get(2)?,
            description: row.get(3)?,
            volume: row.get(4)?,
            purchase_price: row.get(5)?,
            actual_price: row.get(6)?,
            total_purchase_quantity: row.get(7)?,
            total_purchase_dollars: row.get(8)?,
            total_sales_quantity: row.get(9)?,
            total_sales_dollars: row.get(10)?,
            total_sales_price: row.get(11)?,
            total_excise_tax: row.get(12)?,
        })
    })?;

    let rows = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Missing numbers, NaN included, count as zero.
fn fill(value: Option<f64>) -> f64 {
    value.filter(|v| !v.is_nan()).unwrap_or(0.0)
}

fn volume_as_float(volume: &Value) -> Option<f64> {
    let volume = match volume {
        Value::Null => return Some(0.0),
        Value::Boolean(v) => f64::from(u8::from(*v)),
        Value::TinyInt(v) => f64::from(*v),
        Value::SmallInt(v) => f64::from(*v),
        Value::Int(v) => f64::from(*v),
        Value::BigInt(v) => *v as f64,
        Value::HugeInt(v) => *v as f64,
        Value::UTinyInt(v) => f64::from(*v),
        Value::USmallInt(v) => f64::from(*v),
        Value::UInt(v) => f64::from(*v),
        Value::UBigInt(v) => *v as f64,
        Value::Float(v) => f64::from(*v),
        Value::Double(v) => *v,
        Value::Text(v) => v.trim().parse().ok()?,
        _ => return None,
    };
    Some(fill(Some(volume)))
}

/// Casts Volume to float, zero-fills missing values, trims the names and derives the
/// profit columns. Ratios over a zero denominator are left as inf or NaN.
pub fn clean_data(rows: Vec<VendorSummaryRow>) -> Result<Vec<VendorSummary>, DataError> {
    rows.into_iter()
        .map(|row| -> Result<VendorSummary, DataError> {
            let vendor_number = row.vendor_number.unwrap_or_default();
            let brand = row.brand.unwrap_or_default();
            let volume = volume_as_float(&row.volume).ok_or_else(|| DataError::InvalidVolume {
                vendor: vendor_number,
                brand,
                value: render_value(&row.volume),
            })?;

            let total_purchase_quantity = fill(row.total_purchase_quantity);
            let total_purchase_dollars = fill(row.total_purchase_dollars);
            let total_sales_quantity = fill(row.total_sales_quantity);
            let total_sales_dollars = fill(row.total_sales_dollars);
            let gross_profit = total_sales_dollars - total_purchase_dollars;

            Ok(VendorSummary {
                vendor_number,
                vendor_name: row.vendor_name.unwrap_or_default().trim().to_string(),
                brand,
                description: row.description.unwrap_or_default().trim().to_string(),
                volume,
                purchase_price: fill(row.purchase_price),
                actual_price: fill(row.actual_price),
                total_purchase_quantity,
                total_purchase_dollars,
                total_sales_quantity,
                total_sales_dollars,
                total_sales_price: fill(row.total_sales_price),
                total_excise_tax: fill(row.total_excise_tax),
                gross_profit,
                sales_to_purchase_ratio: total_sales_dollars / total_purchase_dollars,
                stock_turnover: total_sales_quantity / total_purchase_quantity,
                profit_margin: gross_profit / total_sales_dollars * 100.0,
            })
        })
        .collect()
}

pub fn summary_table(rows: &[VendorSummary]) -> Table {
    let text = |name| Column::new(name, ColumnType::Varchar);
    let int = |name| Column::new(name, ColumnType::BigInt);
    let double = |name| Column::new(name, ColumnType::Double);

    let mut table = Table::new(vec![
        int("VendorNumber"),
        text("VendorName"),
        int("Brand"),
        text("Description"),
        double("Volume"),
        double("PurchasePrice"),
        double("ActualPrice"),
        double("TotalPurchaseQuantity"),
        double("TotalPurchaseDollars"),
        double("TotalSalesQuantity"),
        double("TotalSalesDollars"),
        double("TotalSalesPrice"),
        double("TotalExciseTax"),
        double("GrossProfit"),
        double("SalesToPurchaseRatio"),
        double("StockTurnover"),
        double("ProfitMargin"),
    ]);

    for row in rows {
        table.push_row(vec![
            Value::BigInt(row.vendor_number),
            Value::Text(row.vendor_name.clone()),
            Value::BigInt(row.brand),
            Value::Text(row.description.clone()),
            Value::Double(row.volume),
            Value::Double(row.purchase_price),
            Value::Double(row.actual_price),
            Value::Double(row.total_purchase_quantity),
            Value::Double(row.total_purchase_dollars),
            Value::Double(row.total_sales_quantity),
            Value::Double(row.total_sales_dollars),
            Value::Double(row.total_sales_price),
            Value::Double(row.total_excise_tax),
            Value::Double(row.gross_profit),
            Value::Double(row.sales_to_purchase_ratio),
            Value::Double(row.stock_turnover),
            Value::Double(row.profit_margin),
        ]);
    }

    table
}

/// First `n` rows rendered as CSV with a header line.
pub fn head<T: Serialize>(rows: &[T], n: usize) -> Result<String, WarehouseError> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for row in rows.iter().take(n) {
        csv_writer.serialize(row)?;
    }

    let bytes = csv_writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Query, clean and persist the vendor summary, replacing any previous `vendor_sales_summary`.
pub fn build_vendor_summary(conn: &mut Connection) -> Result<Vec<VendorSummary>, WarehouseError> {
    info!("Creating Vendor Summary Table...");
    let summary = create_vendor_summary(conn)?;
    info!("{}", head(&summary, HEAD_ROWS)?);

    info!("Cleaning Data...");
    let clean = clean_data(summary)?;
    info!("{}", head(&clean, HEAD_ROWS)?);

    info!("Ingesting Data...");
    ingest_db(conn, SUMMARY_TABLE, &summary_table(&clean))?;
    debug!("{} rows written to {}", clean.len(), SUMMARY_TABLE);
    info!("Ingestion Completed");

    Ok(clean)
}
