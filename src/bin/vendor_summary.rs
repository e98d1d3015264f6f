use std::{env, process};

use log::error;

use inventory_etl::config::Config;
use inventory_etl::logging::{self, SUMMARY_LOG};
use inventory_etl::warehouse::{store, summary, WarehouseError};

fn run(config: &Config) -> Result<(), WarehouseError> {
    let mut conn = store::open(config.db_path())?;
    summary::build_vendor_summary(&mut conn)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let config = match Config::for_summary(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Usage: vendor_summary [db_path] [--log-dir <dir>]");
            process::exit(1);
        },
    };

    if let Err(err) = logging::init(&config.log_file(SUMMARY_LOG)) {
        eprintln!("failed to initialize logging: {}", err);
        process::exit(1);
    }

    if let Err(err) = run(&config) {
        error!("Error occurred: {}", err);
        process::exit(err.kind().exit_code());
    }
}
