pub mod portfolio;
pub mod report;
pub mod settings;
pub mod ticker;
