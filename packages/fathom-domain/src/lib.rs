pub mod catalog;
pub mod cipher;
pub mod clearance;
pub mod dialect;
pub mod sensitivity;
pub mod sqlgate;
