// Crate identity, baked in at build time.

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent with analytics queries, e.g. `cfstats/0.1.0`.
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
