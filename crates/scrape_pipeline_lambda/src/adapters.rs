pub mod message_queue;
pub mod object_store;
pub mod statement_execution;
