//! MongoDB load command.

use tokio::runtime::Runtime;

use crate::artifacts::DataDir;
use crate::config::Config;
use crate::store::loader::{self, LoadReport};

/// Replace the store's collections with the extracted files
pub fn cmd_mongodb(rt: &Runtime, config: &Config, data: &DataDir) -> anyhow::Result<()> {
    println!(
        "Loading {} into {}/{}",
        data.root().display(),
        config.store.connection_string,
        config.store.database
    );

    match rt.block_on(loader::run(&config.store, data)) {
        Some(report) => print_load_report(&report),
        None => println!("✗ MongoDB unreachable, nothing loaded"),
    }
    Ok(())
}

fn print_load_report(report: &LoadReport) {
    if report.index_failures > 0 {
        println!("✗ {} indexes could not be created", report.index_failures);
    }
    for collection in &report.collections {
        match &collection.result {
            Ok(n) => println!("✓ {:<8} {} documents", collection.collection, n),
            Err(e) => println!(
                "✗ {:<8} {}/{} documents: {}",
                collection.collection,
                collection.inserted(),
                collection.prepared,
                e
            ),
        }
    }
}
