//! Persistence of compiled automata.

pub mod store;
