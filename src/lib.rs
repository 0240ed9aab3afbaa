pub mod accrual;
pub mod app;
pub mod auth;
pub mod challenges;
pub mod config;
pub mod error;
pub mod extract;
pub mod quizzes;
pub mod state;
pub mod store;
pub mod users;
