use std::path::Path;

use duckdb::{appender_params_from_iter, params, Connection};
use log::debug;

use super::table::Table;
use super::WarehouseError;

/// Open the database file at `path`, creating it if it doesn't exist.
pub fn open(path: &Path) -> Result<Connection, WarehouseError> {
    let conn = Connection::open(path)?;
    Ok(conn)
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Replace `table_name` with the contents of `table`: the old table is dropped and the new
/// schema created from the table's columns. Drop, create and load commit together.
pub fn ingest_db(conn: &mut Connection, table_name: &str, table: &Table) -> Result<(), WarehouseError> {
    let tx = conn.transaction()?;
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_identifier(table_name)))?;
    tx.execute_batch(&table.create_statement(table_name))?;

    {
        let mut appender = tx.appender(table_name)?;
        for row in table.rows() {
            appender.append_row(appender_params_from_iter(row))?;
        }
        appender.flush()?;
    }

    tx.commit()?;
    debug!("replaced table {} with {} rows", table_name, table.rows().len());

    Ok(())
}

pub fn table_exists(conn: &Connection, table_name: &str) -> Result<bool, WarehouseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables WHERE lower(table_name) = lower(?)",
        params![table_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use duckdb::types::Value;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::warehouse::table::{Column, ColumnType};

    fn brands(rows: &[(i64, &str)]) -> Table {
        let mut table = Table::new(vec![
            Column::new("Brand", ColumnType::BigInt),
            Column::new("Description", ColumnType::Varchar),
        ]);
        for (brand, description) in rows {
            table.push_row(vec![Value::BigInt(*brand), Value::Text(description.to_string())]);
        }
        table
    }

    #[test]
    fn test_ingest_creates_table() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        ingest_db(&mut conn, "brands", &brands(&[(1, "Gin"), (2, "Rum")]))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM brands", [], |row| row.get(0))?;
        assert_eq!(count, 2);
        assert!(table_exists(&conn, "brands")?);
        assert!(!table_exists(&conn, "sales")?);

        Ok(())
    }

    #[test]
    fn test_ingest_replaces_schema_and_rows() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        ingest_db(&mut conn, "brands", &brands(&[(1, "Gin"), (2, "Rum")]))?;

        let mut replacement = Table::new(vec![Column::new("Volume", ColumnType::Double)]);
        replacement.push_row(vec![Value::Double(750.0)]);
        replacement.push_row(vec![Value::Null]);
        replacement.push_row(vec![Value::Double(1.5)]);
        ingest_db(&mut conn, "brands", &replacement)?;

        let total: f64 = conn.query_row("SELECT SUM(Volume) FROM brands", [], |row| row.get(0))?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM brands", [], |row| row.get(0))?;
        let columns: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.columns WHERE table_name = 'brands'",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(total, 751.5);
        assert_eq!(count, 3);
        assert_eq!(columns, 1);

        Ok(())
    }

    #[test]
    fn test_ingest_empty_table() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        ingest_db(&mut conn, "brands", &brands(&[]))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM brands", [], |row| row.get(0))?;
        assert_eq!(count, 0);

        Ok(())
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("sales"), "\"sales\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
