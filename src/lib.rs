// Library for tests to access modules

pub mod advisor;
pub mod anomaly;
pub mod config;
pub mod forecast;
pub mod history_repo;
pub mod models;
pub mod routes;
pub mod sysinfo_repo;
pub mod version;
pub mod worker;
