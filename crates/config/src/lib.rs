//! Configuration for cipher defaults: schema, loading, env substitution and
//! the process-wide defaults holder.
//!
//! Config files: `cipherkit.toml`, `cipherkit.yaml`, or `cipherkit.json`
//! Searched in `./` then `~/.config/cipherkit/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod defaults;
pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{AsymmetricDefaults, CipherConfig, DigestDefaults, SymmetricDefaults},
};
