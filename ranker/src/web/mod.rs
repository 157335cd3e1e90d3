// File: ranker/src/web/mod.rs
pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::scheduler::CycleScheduler;
use crate::store::SharedStore;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scheduler: Arc<CycleScheduler>,
    pub store: Arc<SharedStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, scheduler: Arc<CycleScheduler>, store: Arc<SharedStore>) -> Self {
        Self {
            config,
            scheduler,
            store,
        }
    }
}
