use std::sync::Arc;

use service::customer::{CustomerRepository, CustomerService};

/// Shared axum state: the customer directory behind an explicitly owned repository.
#[derive(Clone)]
pub struct ServerState {
    pub customers: CustomerService,
}

impl ServerState {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { customers: CustomerService::new(repo) }
    }
}
