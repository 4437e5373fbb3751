//! Service layer for the customer directory.
//! - `customer::repository` is the storage seam (trait + in-memory store).
//! - `customer::service` holds the directory rules on top of a repository.
//! - Errors are reported through `errors::ServiceError`.

pub mod errors;
pub mod customer;
