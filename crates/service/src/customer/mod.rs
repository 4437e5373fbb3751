pub mod repository;
pub mod service;

pub use repository::{CustomerRepository, InMemoryCustomerRepository};
pub use service::CustomerService;
