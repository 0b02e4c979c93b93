// Build-time identity from Cargo.toml: served on GET /version and sent as the
// advisor's User-Agent.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `<name>/<version>`, e.g. `perfwatch/0.1.0`.
pub fn user_agent() -> String {
    format!("{}/{}", NAME, VERSION)
}
