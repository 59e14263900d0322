// Infrastructure module - Background task lifecycle and reconnect timing
pub mod task_manager;
pub mod timer;

pub use task_manager::TaskManager;
pub use timer::Backoff;
