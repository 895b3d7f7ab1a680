//! Data Transfer Objects
//!
//! Wire shapes exchanged with external collaborators (parameter store,
//! repository host). Kept separate from the domain types so the domain can
//! evolve without changing what goes over the network.

pub mod parameter;
pub mod repository;
