// Small helpers shared by the adapters.

pub mod rng;
