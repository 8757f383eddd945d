//! Bundled templates of the built-in languages

pub const RUST_MODEL_TEMPLATE: &str = include_str!("templates/rust/model.hbs");
pub const RUST_QUERY_TEMPLATE: &str = include_str!("templates/rust/query.hbs");
pub const RUST_CONN_TEMPLATE: &str = include_str!("templates/rust/conn.hbs");
pub const RUST_CACHE_TEMPLATE: &str = include_str!("templates/rust/cache.hbs");
pub const RUST_INIT_TEMPLATE: &str = include_str!("templates/rust/init.hbs");

pub const GOLANG_MODEL_TEMPLATE: &str = include_str!("templates/golang/model.hbs");
pub const GOLANG_QUERY_TEMPLATE: &str = include_str!("templates/golang/query.hbs");
pub const GOLANG_CONN_TEMPLATE: &str = include_str!("templates/golang/conn.hbs");
pub const GOLANG_CACHE_TEMPLATE: &str = include_str!("templates/golang/cache.hbs");
pub const GOLANG_INIT_TEMPLATE: &str = include_str!("templates/golang/init.hbs");
