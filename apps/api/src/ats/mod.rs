pub mod handlers;
pub mod matcher;
