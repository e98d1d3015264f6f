use thiserror::Error;

pub mod store;
pub mod summary;
pub mod table;


#[derive(Debug, PartialEq, Error)]
pub enum DataError {
    #[error("file has no header row")]
    NoColumns,
    #[error("line {line}: expected {expected} fields, found {found}")]
    TooManyFields { line: u64, expected: usize, found: usize },
    #[error("volume `{value}` of vendor {vendor} brand {brand} is not a number")]
    InvalidVolume { vendor: i64, brand: i64, value: String },
}

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Database(#[from] duckdb::Error),
    #[error("{0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Data,
    Database,
}

impl ErrorKind {
    /// Process exit status reported for this class of failure.
    /// 1 is left to usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Io => 2,
            ErrorKind::Data => 3,
            ErrorKind::Database => 4,
        }
    }
}

impl WarehouseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WarehouseError::Io(_) => ErrorKind::Io,
            WarehouseError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => ErrorKind::Io,
                _ => ErrorKind::Data,
            },
            WarehouseError::Database(_) => ErrorKind::Database,
            WarehouseError::Data(_) => ErrorKind::Data,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_error_kinds() {
        let io = WarehouseError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(io.kind().exit_code(), 2);

        let data = WarehouseError::from(DataError::NoColumns);
        assert_eq!(data.kind(), ErrorKind::Data);
        assert_eq!(data.kind().exit_code(), 3);
    }

    #[test]
    fn test_malformed_csv_is_data_error() {
        let mut reader = csv::ReaderBuilder::new().from_reader("a,b\n1,2,3\n".as_bytes());
        let err = reader.records().find_map(|record| record.err()).map(WarehouseError::from);

        assert_eq!(err.map(|err| err.kind()), Some(ErrorKind::Data));
    }
}
