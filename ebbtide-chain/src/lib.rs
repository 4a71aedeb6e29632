//! Core Ebbtide data structures.
//!
//! This crate provides definitions of the core datastructures for Ebbtide,
//! such as transactions, boxes, and monetary parameters. It deliberately
//! contains no validation or wire-format code: transactions arrive here
//! already checked, and are only inspected by structure.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate serde;

pub mod parameters;
pub mod transaction;
pub mod transparent;
