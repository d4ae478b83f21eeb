pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod store;
pub mod validation;
