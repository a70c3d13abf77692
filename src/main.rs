#![cfg(not(tarpaulin_include))]

use medcalc::app;
use medcalc::config::Config;
use std::env;

/// Main entry point for the calculator admin web service
///
/// Configuration comes from the `MEDCALC_*` environment variables; an
/// optional first argument overrides the bind address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let mut config = Config::from_env()?;
    if args.len() >= 2 {
        config = config.with_bind(&args[1])?;
    }

    log::info!(
        "Starting calculator admin with {:?} store at {}",
        config.store,
        config.database_dir.display()
    );
    app::run(config).await
}
