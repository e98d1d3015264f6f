use std::{env, process};

use anyhow::Result;
use log::{debug, error};

use inventory_etl::config::Config;
use inventory_etl::logging::{self, LOADER_LOG};
use inventory_etl::{data, warehouse::store};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let config = match Config::for_loader(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Usage: ingest_db [data_dir] [db_path] [--log-dir <dir>]");
            process::exit(1);
        },
    };

    logging::init(&config.log_file(LOADER_LOG))?;

    let result = store::open(config.db_path())
        .and_then(|mut conn| data::load_raw_data(config.data_dir(), &mut conn));
    match result {
        Ok(report) => debug!("loaded {} tables into {}", report.tables.len(), config.db_path().display()),
        Err(err) => {
            error!("ingestion failed: {}", err);
            return Err(err.into());
        },
    }

    Ok(())
}
