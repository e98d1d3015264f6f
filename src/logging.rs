use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;

pub const LOADER_LOG: &str = "ingestion_db.log";
pub const SUMMARY_LOG: &str = "get_vendor_summary.log";

/// Installs the process logger, appending `<timestamp> - <LEVEL> - <message>` lines to `path`.
/// Logs at debug and up unless `RUST_LOG` says otherwise.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| writeln!(buf, "{} - {} - {}", buf.timestamp_millis(), record.level(), record.args()));
    builder.try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use log::info;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_init_appends_to_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("logs").join(LOADER_LOG);

        init(&path)?;
        info!("Ingesting sales.csv into DB");
        log::logger().flush();

        let contents = fs::read_to_string(&path)?;
        assert!(contents.lines().any(|line| line.ends_with(" - INFO - Ingesting sales.csv into DB")));

        Ok(())
    }
}
