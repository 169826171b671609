pub mod config;
pub mod consts;
pub mod error;
pub mod genome;
pub mod merit;
pub mod phenotype;
pub mod policy;
pub mod population;
pub mod rng;
pub mod scheduler;
pub mod settings;
// cmd and reports are binary modules, declared from main.rs.
