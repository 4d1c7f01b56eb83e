pub mod capabilities;
pub mod composer;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod request;
pub mod result;
pub mod target;
pub mod visual;
pub mod wizard;

// Handy re-exports to keep imports short elsewhere
pub use capabilities::{AggregationMode, Capabilities, DataSourceKind};
pub use error::DomainError;
pub use request::ExecutionRequest;
pub use result::QueryResult;
