pub mod resume;
pub mod roadmap;
pub mod user;
