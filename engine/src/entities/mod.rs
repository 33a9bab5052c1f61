pub mod aircraft;
pub mod airspace;
pub mod storm;
