//! Domain types shared by the acquisition agent and the HTTP server:
//! the [`Reading`](reading::Reading) sample, its parser, and the
//! latest-value store that hands readings from one to the other.

pub mod error;
pub mod parser;
pub mod reading;
pub mod store;
