pub mod game_alerts;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod settings;
pub mod store;
