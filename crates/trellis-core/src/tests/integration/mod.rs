#![cfg(test)]

pub mod boot_tests;
pub mod common;
pub mod config_tests;
pub mod extension_tests;
