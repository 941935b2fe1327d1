pub mod balance;
pub mod errors;
