pub mod common;
pub mod debug;
pub mod detail;
pub mod feed;
pub mod search;
pub mod sources;
pub mod status_bar;
