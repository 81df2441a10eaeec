//! tests/mod.rs
//! Pruebas de servicios y endpoints sobre SQLite en memoria.

#[macro_use]
mod common;

mod delivery_tests;
mod routing_policy_tests;
