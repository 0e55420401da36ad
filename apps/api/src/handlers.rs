pub mod access;
pub mod health;
pub mod records;
pub mod scope;
pub mod security;
