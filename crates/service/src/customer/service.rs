use std::sync::Arc;

use models::Customer;
use tracing::{debug, info, instrument};

use crate::customer::repository::CustomerRepository;
use crate::errors::ServiceError;

/// Customer directory: CRUD and name search over a `CustomerRepository`.
///
/// The service is framework independent; the HTTP layer only maps its results
/// to status codes.
#[derive(Clone)]
pub struct CustomerService {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self { Self { repo } }

    /// All customers, in the repository's natural order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Customer>, ServiceError> {
        let customers = self.repo.list().await?;
        debug!(count = customers.len(), "customers_listed");
        Ok(customers)
    }

    /// Look up one customer. Absence is `Ok(None)`, never an error.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> Result<Option<Customer>, ServiceError> {
        let found = self.repo.get(id).await?;
        debug!(customer_id = id, found = found.is_some(), "customer_lookup");
        Ok(found)
    }

    /// Store a new customer under its caller-supplied id.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::customer::sample_customers;
    /// use service::customer::{CustomerService, InMemoryCustomerRepository};
    /// use service::errors::ServiceError;
    ///
    /// let svc = CustomerService::new(Arc::new(InMemoryCustomerRepository::new()));
    /// let john = sample_customers().remove(0);
    /// let stored = tokio_test::block_on(svc.create(Some(john.clone()))).unwrap();
    /// assert_eq!(stored, john);
    /// let again = tokio_test::block_on(svc.create(Some(john)));
    /// assert_eq!(again, Err(ServiceError::DuplicateId(1)));
    /// ```
    #[instrument(skip(self, customer), fields(customer_id = customer.as_ref().map(|c| c.id)))]
    pub async fn create(&self, customer: Option<Customer>) -> Result<Customer, ServiceError> {
        let customer = customer.ok_or_else(|| ServiceError::InvalidInput("customer body is required".into()))?;
        let stored = self.repo.insert(customer).await?;
        info!(customer_id = stored.id, "customer_created");
        Ok(stored)
    }

    /// Overwrite first name, last name and date of birth of customer `id`.
    ///
    /// A missing target is not an error: the call succeeds without touching the
    /// store, so callers cannot tell "updated" from "nothing to update".
    #[instrument(skip(self, customer), fields(customer_id = id))]
    pub async fn update(&self, id: i32, customer: Option<Customer>) -> Result<(), ServiceError> {
        let customer = customer.ok_or_else(|| ServiceError::InvalidInput("customer body is required".into()))?;
        if customer.id != id {
            return Err(ServiceError::IdMismatch { path: id, body: customer.id });
        }
        let touched = self.repo.update(&customer).await?;
        if touched {
            info!(customer_id = id, "customer_updated");
        } else {
            info!(customer_id = id, "customer_update_skipped_missing");
        }
        Ok(())
    }

    /// Remove customer `id`; `NotFound` when there is nothing to remove.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("customer", id));
        }
        info!(customer_id = id, "customer_deleted");
        Ok(())
    }

    /// Customers whose first or last name contains `fragment`, ignoring case.
    /// `None` and `""` both match everyone.
    #[instrument(skip(self))]
    pub async fn search_by_name(&self, fragment: Option<&str>) -> Result<Vec<Customer>, ServiceError> {
        let hits = self.repo.search_by_name(fragment.unwrap_or_default()).await?;
        debug!(count = hits.len(), "customers_searched");
        Ok(hits)
    }

    /// Insert `customers`, skipping ids that already exist. Returns how many were added.
    #[instrument(skip_all)]
    pub async fn seed<I: IntoIterator<Item = Customer>>(&self, customers: I) -> Result<usize, ServiceError> {
        let mut inserted = 0;
        for c in customers {
            match self.repo.insert(c).await {
                Ok(_) => inserted += 1,
                Err(ServiceError::DuplicateId(id)) => debug!(customer_id = id, "seed_skip_existing"),
                Err(e) => return Err(e),
            }
        }
        info!(inserted, "customers_seeded");
        Ok(inserted)
    }
}
