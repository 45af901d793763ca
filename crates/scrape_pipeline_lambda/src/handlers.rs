pub mod loader;
pub mod publisher;
pub mod statement_waiter;
