pub mod config;
pub mod constants;
pub mod endpoint;
pub mod errors;
pub mod probes;
pub mod processor;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use endpoint::{EndpointRecord, ProbeOutcome, Protocol, ResultCollector};
pub use processor::{ChainProcessor, ChainReport};
pub use registry::{ChainConfigProvider, ChainConfigSource, ChainEndpoints, GithubRegistry};
pub use scheduler::CycleScheduler;
pub use store::SharedStore;
