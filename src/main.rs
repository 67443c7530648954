// src/main.rs

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use metaseek::{Config, Engine};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <query> <root> [root ...]", args[0]);
        eprintln!("  e.g. {} 'extension:pdf AND size_bytes:[1048576 TO ]' ~/Documents", args[0]);
        return Ok(());
    }

    let query = args[1].clone();
    let scan_paths: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();

    let db_path = env::var("METASEEK_DB").unwrap_or_else(|_| "metaseek.db".to_string());
    let config = Config {
        db_path: PathBuf::from(db_path),
        scan_paths,
        lazy_indexing: true,
        enable_watcher: false,
    };

    tracing::info!("metaseek starting, {} root(s)", config.scan_paths.len());
    let engine = Engine::new(config)?;

    let results = engine.search(&query)?;
    if results.is_empty() {
        println!("No match found.");
    } else {
        for record in &results {
            println!("{}", record);
        }
    }

    engine.shutdown();
    Ok(())
}
