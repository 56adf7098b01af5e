// Core services
pub mod customers;
pub mod lookups;
pub mod orders;
pub mod products;
pub mod quotes;
