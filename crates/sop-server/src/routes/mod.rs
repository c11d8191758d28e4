pub mod facade;
pub mod issues;
pub mod meetings;
pub mod objects;
pub mod pins;
pub mod recurring;
pub mod reports;
pub mod tokens;
