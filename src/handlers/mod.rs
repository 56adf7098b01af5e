pub mod customers;
pub mod lookups;
pub mod orders;
pub mod products;
pub mod quotes;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<services::customers::CustomerService>,
    pub lookups: Arc<services::lookups::LookupService>,
    pub products: Arc<services::products::ProductService>,
    pub quotes: Arc<services::quotes::QuoteService>,
    pub orders: Arc<services::orders::OrderService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            customers: Arc::new(services::customers::CustomerService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            lookups: Arc::new(services::lookups::LookupService::new(db_pool.clone())),
            products: Arc::new(services::products::ProductService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            quotes: Arc::new(services::quotes::QuoteService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            orders: Arc::new(services::orders::OrderService::new(db_pool, event_sender)),
        }
    }
}
