//! Common, shared types.

pub mod layers;
pub mod messages;
pub mod rng;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
