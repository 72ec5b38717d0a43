pub mod aggregate;
pub mod pipeline;
pub mod reshape;
pub mod statistics;
