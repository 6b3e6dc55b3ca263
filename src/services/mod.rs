pub mod auth;
pub mod encryption;
pub mod matching;
pub mod payroll;
pub mod queue;
pub mod screening;
pub mod storage;
