mod app;
mod config;
mod http;
mod request;
mod run;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use request::RequestError;
pub use run::RunConfigError;
pub use validation::ValidationError;
