//! Process-wide cipher defaults.
//!
//! Set once at startup (typically from [`discover_and_load`](crate::discover_and_load))
//! and read by cipher constructors. Ciphers copy what they need when they are
//! built, so changing the defaults never affects an existing cipher.

use std::sync::{LazyLock, RwLock};

use crate::schema::CipherConfig;

static DEFAULTS: LazyLock<RwLock<CipherConfig>> =
    LazyLock::new(|| RwLock::new(CipherConfig::default()));

/// Snapshot of the current defaults.
pub fn current() -> CipherConfig {
    DEFAULTS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Replace the defaults wholesale.
pub fn install(config: CipherConfig) {
    *DEFAULTS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    tracing::debug!("cipher defaults installed");
}

/// Modify the defaults in place.
pub fn update(f: impl FnOnce(&mut CipherConfig)) {
    let mut guard = DEFAULTS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard);
}

/// Restore the built-in defaults.
pub fn reset() {
    install(CipherConfig::default());
}
