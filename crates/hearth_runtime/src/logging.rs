//! Log sink setup
//!
//! Installs a `tracing_subscriber` formatter the first time an entry point
//! runs. A subscriber installed earlier by the host (or a test) is kept.

use once_cell::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::new();

pub fn init() {
    INIT.get_or_init(|| {
        if tracing_subscriber::fmt().try_init().is_ok() {
            tracing::info!("Hearth bridge v{}", hearth_core::VERSION);
        }
    });
}
