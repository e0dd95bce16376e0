pub mod align_guide_use_case;
pub mod infrastructure;
pub mod session_logger;
pub mod tick_scheduler;
