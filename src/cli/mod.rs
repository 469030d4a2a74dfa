pub mod list;
pub mod manage;
pub mod setup;
pub mod summary;
pub mod ui;
