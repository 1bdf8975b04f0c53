pub mod eth;
pub mod pool;
pub mod vault;
