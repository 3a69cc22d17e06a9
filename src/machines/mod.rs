//! Concrete machines of the brewing appliance.
//!
//! - [`main`]: parameter collection, deadline preparation and heating
//! - [`heating`]: measurement cycle that hands off to a PID collaborator

pub mod heating;
pub mod main;
