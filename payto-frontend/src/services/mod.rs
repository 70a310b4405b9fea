pub mod forms;
pub mod metrics;
pub mod refresh;
pub mod sidebar;
