use duckdb::types::Value;
use getset::Getters;

use super::store::quote_identifier;
use super::DataError;

/// Cell contents a CSV reader treats as missing.
const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    BigInt,
    Double,
    Varchar,
}

impl ColumnType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Varchar => "VARCHAR",
        }
    }

    fn parse(&self, raw: &str) -> Option<Value> {
        match self {
            ColumnType::Boolean => match raw {
                "True" | "TRUE" | "true" => Some(Value::Boolean(true)),
                "False" | "FALSE" | "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            ColumnType::BigInt => raw.trim().parse().ok().map(Value::BigInt),
            ColumnType::Double => raw.trim().parse().ok().map(Value::Double),
            ColumnType::Varchar => Some(Value::Text(raw.to_string())),
        }
    }
}

pub fn is_na(raw: &str) -> bool {
    NA_VALUES.contains(&raw)
}

/// Picks the narrowest type every non-null cell parses as and converts the cells to it.
/// A column without any value is DOUBLE.
pub fn infer_column(cells: &[Option<&str>]) -> (ColumnType, Vec<Value>) {
    if cells.iter().all(Option::is_none) {
        return (ColumnType::Double, vec![Value::Null; cells.len()]);
    }

    for column_type in [ColumnType::Boolean, ColumnType::BigInt, ColumnType::Double] {
        let parsed: Option<Vec<Value>> = cells
            .iter()
            .map(|cell| match cell {
                Some(raw) => column_type.parse(raw),
                None => Some(Value::Null),
            })
            .collect();

        if let Some(values) = parsed {
            return (column_type, values);
        }
    }

    let values = cells
        .iter()
        .map(|cell| match cell {
            Some(raw) => Value::Text(raw.to_string()),
            None => Value::Null,
        })
        .collect();
    (ColumnType::Varchar, values)
}

/// Text form of a cell, used for log previews and error messages.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(v) => v.to_string(),
        Value::TinyInt(v) => v.to_string(),
        Value::SmallInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::HugeInt(v) => v.to_string(),
        Value::UTinyInt(v) => v.to_string(),
        Value::USmallInt(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::UBigInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        other => format!("{other:?}"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: &str, column_type: ColumnType) -> Column {
        Column {
            name: name.to_string(),
            column_type,
        }
    }
}

/// Row-major in-memory table, written to the database as a whole.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from raw header names and cells, inferring one type per column.
    /// Every record must already be as wide as the header.
    pub fn from_records(headers: Vec<String>, records: &[Vec<Option<String>>]) -> Result<Table, DataError> {
        if headers.is_empty() {
            return Err(DataError::NoColumns);
        }

        let mut columns = Vec::with_capacity(headers.len());
        let mut rows: Vec<Vec<Value>> = records.iter().map(|_| Vec::with_capacity(headers.len())).collect();

        for (index, name) in headers.into_iter().enumerate() {
            let cells: Vec<Option<&str>> = records.iter().map(|record| record[index].as_deref()).collect();
            let (column_type, values) = infer_column(&cells);

            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            columns.push(Column { name, column_type });
        }

        Ok(Table { columns, rows })
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn create_statement(&self, table_name: &str) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("{} {}", quote_identifier(&column.name), column.column_type.sql_name()))
            .collect();

        format!("CREATE TABLE {} ({});", quote_identifier(table_name), columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_infer_integers() {
        let (column_type, values) = infer_column(&[Some("1"), None, Some("-3")]);

        assert_eq!(column_type, ColumnType::BigInt);
        assert_eq!(values, vec![Value::BigInt(1), Value::Null, Value::BigInt(-3)]);
    }

    #[test]
    fn test_infer_widens_to_double() {
        let (column_type, values) = infer_column(&[Some("1"), Some("2.5")]);

        assert_eq!(column_type, ColumnType::Double);
        assert_eq!(values, vec![Value::Double(1.0), Value::Double(2.5)]);
    }

    #[test]
    fn test_infer_numbers_ignore_padding() {
        let (column_type, values) = infer_column(&[Some(" 5 "), Some("7")]);
        assert_eq!(column_type, ColumnType::BigInt);
        assert_eq!(values, vec![Value::BigInt(5), Value::BigInt(7)]);

        let (column_type, values) = infer_column(&[Some("2.5 "), Some(" 1")]);
        assert_eq!(column_type, ColumnType::Double);
        assert_eq!(values, vec![Value::Double(2.5), Value::Double(1.0)]);
    }

    #[test]
    fn test_infer_booleans() {
        let (column_type, _) = infer_column(&[Some("True"), Some("false")]);
        assert_eq!(column_type, ColumnType::Boolean);
    }

    #[test]
    fn test_infer_falls_back_to_text() {
        let (column_type, values) = infer_column(&[Some("750"), Some("Unknown")]);

        assert_eq!(column_type, ColumnType::Varchar);
        assert_eq!(values, vec![Value::Text("750".to_string()), Value::Text("Unknown".to_string())]);
    }

    #[test]
    fn test_infer_empty_column_is_double() {
        let (column_type, values) = infer_column(&[None, None]);

        assert_eq!(column_type, ColumnType::Double);
        assert_eq!(values, vec![Value::Null, Value::Null]);
    }

    #[test]
    fn test_na_markers() {
        assert!(is_na(""));
        assert!(is_na("NaN"));
        assert!(is_na("#N/A"));
        assert!(!is_na("0"));
        assert!(!is_na(" "));
    }

    #[test]
    fn test_create_statement_quotes_identifiers() -> anyhow::Result<()> {
        let table = Table::from_records(
            vec!["Brand".to_string(), "Say \"hi\"".to_string()],
            &[vec![Some("1".to_string()), Some("x".to_string())]],
        )?;

        assert_eq!(
            table.create_statement("2017 sales"),
            "CREATE TABLE \"2017 sales\" (\"Brand\" BIGINT, \"Say \"\"hi\"\"\" VARCHAR);"
        );
        assert_eq!(table.shape(), (1, 2));

        Ok(())
    }

    #[test]
    fn test_from_records_requires_header() {
        assert_eq!(Table::from_records(Vec::new(), &[]), Err(DataError::NoColumns));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(render_value(&Value::Double(0.5)), "0.5");
        assert_eq!(render_value(&Value::Text("750mL".to_string())), "750mL");
    }
}
