pub mod error;
pub mod logger;
pub mod monitor;
pub mod stop;
pub mod validation;
