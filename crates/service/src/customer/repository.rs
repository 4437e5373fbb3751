use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use models::Customer;
use tokio::sync::RwLock;

use crate::errors::ServiceError;

/// Storage abstraction for customer records.
///
/// Every method is a single atomic step against the store: implementations must
/// not let two writers interleave on the same id.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Customer>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<Customer>, ServiceError>;
    /// Insert a new record; `DuplicateId` if the id is taken.
    async fn insert(&self, customer: Customer) -> Result<Customer, ServiceError>;
    /// Overwrite the mutable fields of the record with `customer.id`; returns whether one existed.
    async fn update(&self, customer: &Customer) -> Result<bool, ServiceError>;
    /// Remove by id; returns whether it existed.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Customer>, ServiceError>;
}

/// In-memory store keyed by customer id, iterated in ascending id order.
#[derive(Clone, Default)]
pub struct InMemoryCustomerRepository {
    inner: Arc<RwLock<BTreeMap<i32, Customer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self { Self::default() }

    /// Build a store pre-filled with `customers`; later duplicates replace earlier ones.
    pub fn with_customers<I: IntoIterator<Item = Customer>>(customers: I) -> Self {
        let map = customers.into_iter().map(|c| (c.id, c)).collect();
        Self { inner: Arc::new(RwLock::new(map)) }
    }

    /// Number of stored customers.
    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn list(&self) -> Result<Vec<Customer>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Customer>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, customer: Customer) -> Result<Customer, ServiceError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&customer.id) {
            return Err(ServiceError::DuplicateId(customer.id));
        }
        map.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, customer: &Customer) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        match map.get_mut(&customer.id) {
            Some(existing) => {
                existing.apply_update(customer);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(map.remove(&id).is_some())
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Customer>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().filter(|c| c.name_contains(fragment)).cloned().collect())
    }
}

/// Test doubles for code that depends on `CustomerRepository`.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Repository whose every call fails with `ServiceError::Store`.
    #[derive(Default)]
    pub struct FailingCustomerRepository;

    fn unavailable<T>() -> Result<T, ServiceError> {
        Err(ServiceError::Store("store unavailable".into()))
    }

    #[async_trait]
    impl CustomerRepository for FailingCustomerRepository {
        async fn list(&self) -> Result<Vec<Customer>, ServiceError> { unavailable() }
        async fn get(&self, _id: i32) -> Result<Option<Customer>, ServiceError> { unavailable() }
        async fn insert(&self, _customer: Customer) -> Result<Customer, ServiceError> { unavailable() }
        async fn update(&self, _customer: &Customer) -> Result<bool, ServiceError> { unavailable() }
        async fn delete(&self, _id: i32) -> Result<bool, ServiceError> { unavailable() }
        async fn search_by_name(&self, _fragment: &str) -> Result<Vec<Customer>, ServiceError> { unavailable() }
    }

    /// In-memory repository that counts write calls reaching the store.
    #[derive(Default)]
    pub struct CountingCustomerRepository {
        pub store: InMemoryCustomerRepository,
        writes: AtomicUsize,
    }

    impl CountingCustomerRepository {
        pub fn with_customers<I: IntoIterator<Item = Customer>>(customers: I) -> Self {
            Self { store: InMemoryCustomerRepository::with_customers(customers), writes: AtomicUsize::new(0) }
        }

        pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

        fn record_write(&self) { self.writes.fetch_add(1, Ordering::SeqCst); }
    }

    #[async_trait]
    impl CustomerRepository for CountingCustomerRepository {
        async fn list(&self) -> Result<Vec<Customer>, ServiceError> { self.store.list().await }
        async fn get(&self, id: i32) -> Result<Option<Customer>, ServiceError> { self.store.get(id).await }
        async fn insert(&self, customer: Customer) -> Result<Customer, ServiceError> {
            self.record_write();
            self.store.insert(customer).await
        }
        async fn update(&self, customer: &Customer) -> Result<bool, ServiceError> {
            self.record_write();
            self.store.update(customer).await
        }
        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            self.record_write();
            self.store.delete(id).await
        }
        async fn search_by_name(&self, fragment: &str) -> Result<Vec<Customer>, ServiceError> {
            self.store.search_by_name(fragment).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use models::customer::sample_customers;

    fn customer(id: i32, first: &str, last: &str) -> Customer {
        Customer::new(id, first, last, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_and_keeps_original() -> Result<(), anyhow::Error> {
        let repo = InMemoryCustomerRepository::new();
        repo.insert(customer(1, "John", "Doe")).await?;
        let err = repo.insert(customer(1, "Other", "Person")).await.unwrap_err();
        assert_eq!(err, ServiceError::DuplicateId(1));
        assert_eq!(repo.get(1).await?.unwrap().first_name, "John");
        assert_eq!(repo.count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn list_is_in_id_order() -> Result<(), anyhow::Error> {
        let repo = InMemoryCustomerRepository::new();
        for id in [3, 1, 2] {
            repo.insert(customer(id, "A", "B")).await?;
        }
        let ids: Vec<i32> = repo.list().await?.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_report_presence() -> Result<(), anyhow::Error> {
        let repo = InMemoryCustomerRepository::with_customers(sample_customers());
        assert!(repo.update(&customer(2, "Janet", "Smythe")).await?);
        assert!(!repo.update(&customer(42, "No", "One")).await?);
        assert_eq!(repo.get(2).await?.unwrap().last_name, "Smythe");
        assert!(repo.get(42).await?.is_none());

        assert!(repo.delete(2).await?);
        assert!(!repo.delete(2).await?);
        assert_eq!(repo.count().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn clones_share_the_same_store() -> Result<(), anyhow::Error> {
        let repo = InMemoryCustomerRepository::new();
        let other = repo.clone();
        other.insert(customer(5, "Shared", "State")).await?;
        assert!(repo.get(5).await?.is_some());
        assert_eq!(repo.count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_first_or_last_name() -> Result<(), anyhow::Error> {
        let repo = InMemoryCustomerRepository::with_customers(sample_customers());
        let hits: Vec<i32> = repo.search_by_name("JO").await?.into_iter().map(|c| c.id).collect();
        assert_eq!(hits, vec![1, 3]);
        assert_eq!(repo.search_by_name("").await?.len(), 3);
        assert!(repo.search_by_name("zzz").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failing_repository_reports_store_errors() {
        let repo = mock::FailingCustomerRepository;
        assert!(matches!(repo.list().await, Err(ServiceError::Store(_))));
        assert!(matches!(repo.delete(1).await, Err(ServiceError::Store(_))));
    }
}
