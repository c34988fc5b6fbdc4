//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `forgesite_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use forgesite_core::db::open_db_in_memory;
use forgesite_core::{Aggregator, UnitKind, UnitRegistry};

fn main() {
    println!("forgesite_core version={}", forgesite_core::core_version());

    // Open a throwaway database to confirm migrations and the compiled-in
    // catalog are wired together.
    match open_db_in_memory() {
        Ok(conn) => {
            let registry = UnitRegistry::with_default_kinds(&conn);
            let aggregator = Aggregator::new(&registry);
            let active_processes = aggregator
                .count_active_across_kinds(&UnitKind::processes())
                .unwrap_or(0);
            println!("kinds={}", registry.kinds().len());
            println!("active_processes={active_processes}");
        }
        Err(err) => {
            eprintln!("db bootstrap failed: {err}");
            std::process::exit(1);
        }
    }
}
