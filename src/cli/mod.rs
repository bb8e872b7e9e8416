pub mod import;
pub mod setup;
pub mod ui;
pub mod watchlist;
