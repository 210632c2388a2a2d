pub mod errors;
pub mod middleware;
pub mod observability;
pub mod plugin;
pub mod routes;
pub mod startup;

pub use startup::run;
