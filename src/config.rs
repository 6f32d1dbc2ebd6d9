//! Process-wide configuration.
//!
//! Two pieces of mutable global state: the `tempEmulationSchema` slot,
//! written rarely and read concurrently, and the session salt, created
//! lazily on first use and stable for the life of the process.

use std::sync::{LazyLock, OnceLock, RwLock};

use rand::distributions::Alphanumeric;
use rand::Rng;

static TEMP_EMULATION_SCHEMA: LazyLock<RwLock<Option<String>>> = LazyLock::new(|| RwLock::new(None));
static SESSION_SALT: OnceLock<String> = OnceLock::new();

/// Set the process-wide default schema used for `#name` rewriting when
/// a caller omits `tempEmulationSchema` from a `translate` call.
pub fn set_temp_emulation_schema(schema: Option<String>) {
    *TEMP_EMULATION_SCHEMA
        .write()
        .expect("temp emulation schema lock poisoned") = schema;
}

/// Read the process-wide default temp-emulation schema.
pub fn temp_emulation_schema() -> Option<String> {
    TEMP_EMULATION_SCHEMA
        .read()
        .expect("temp emulation schema lock poisoned")
        .clone()
}

/// The per-process session salt, generated once and stable thereafter.
pub fn session_salt() -> &'static str {
    SESSION_SALT.get_or_init(generate_salt)
}

fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
