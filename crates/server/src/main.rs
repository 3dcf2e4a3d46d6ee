#![forbid(unsafe_code)]

use ns_server::service::ImportService;
use ns_server::{defaults, entry};
use ns_storage::SqliteStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let storage_dir = defaults::resolve_storage_dir();
    let store = match SqliteStore::open(&storage_dir) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(%err, dir = %storage_dir.display(), "failed to open store");
            std::process::exit(1);
        }
    };
    tracing::info!(dir = %storage_dir.display(), "novelshelf serving on stdio");

    let mut service = ImportService::new(store);
    if let Err(err) = entry::run_stdio(&mut service) {
        tracing::error!(%err, "stdio loop failed");
        std::process::exit(1);
    }
}
