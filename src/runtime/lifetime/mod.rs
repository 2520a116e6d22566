pub mod lifespan;
pub mod shutdown;
pub mod startup;
