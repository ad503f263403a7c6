//! Synthetic client histories for exercising the consistency oracle.

pub mod generator;

pub use generator::{
    generate_mult_histories, generate_single_history, ClientOperation, GenParams, History,
};
