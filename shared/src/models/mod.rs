//! Data models shared by the onboarding server and its clients

pub mod employee;

pub use employee::*;
