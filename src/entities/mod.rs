pub mod custom_product;
pub mod customer;
pub mod matrix_size;
pub mod order;
pub mod order_item;
pub mod order_status_history;
pub mod paper_type;
pub mod payment;
pub mod quote;
