// Domain models and numeric helpers shared by the engine and its collaborators.
pub mod models;
pub mod utils;
