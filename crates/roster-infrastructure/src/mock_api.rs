//! In-memory mock user API.
//!
//! `MockUserApi` implements [`RemoteCollection`] for [`User`] on top of a
//! vector of generated users. Every call first waits a random latency and
//! may fail with a transient service error, so callers see the same
//! behaviour they would against a flaky network.

use crate::query_engine::run_query;
use crate::seed::generate_users;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roster_core::collection::{Record, RemoteCollection};
use roster_core::config::ApiConfig;
use roster_core::error::{Result, RosterError};
use roster_core::query::{Page, Query};
use roster_core::role::{ROLES, Role};
use roster_core::user::{NewUser, User, UserPatch};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Message of every simulated service failure.
pub const FAILURE_MESSAGE: &str = "API request failed. Please try again.";

/// Mock implementation of the user collection service.
///
/// # Example
///
/// ```ignore
/// use roster_core::config::ApiConfig;
/// use roster_infrastructure::MockUserApi;
///
/// let api = MockUserApi::new(ApiConfig::default());
/// let page = api.list(&Query::default()).await?;
/// ```
pub struct MockUserApi {
    users: RwLock<Vec<User>>,
    /// Next numeric id handed out by `create`; never reused
    next_id: AtomicUsize,
    /// Number of upcoming calls forced to fail
    forced_failures: AtomicUsize,
    rng: Mutex<StdRng>,
    config: ApiConfig,
}

impl MockUserApi {
    /// Creates the API with `config.seed_count` generated users.
    pub fn new(config: ApiConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let today = chrono::Utc::now().date_naive();
        let users = generate_users(config.seed_count, &mut rng, today);

        Self::from_parts(users, rng, config)
    }

    /// Creates the API over an explicit user list.
    pub fn with_users(users: Vec<User>, config: ApiConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::from_parts(users, rng, config)
    }

    fn from_parts(users: Vec<User>, rng: StdRng, config: ApiConfig) -> Self {
        tracing::debug!(
            "[MockUserApi] Seeded with {} users (latency {}-{}ms, failure rate {})",
            users.len(),
            config.latency_min_ms,
            config.latency_max_ms,
            config.failure_rate
        );

        Self {
            next_id: AtomicUsize::new(users.len() + 1),
            users: RwLock::new(users),
            forced_failures: AtomicUsize::new(0),
            rng: Mutex::new(rng),
            config,
        }
    }

    /// Forces the next `count` calls to fail with a service error.
    pub fn fail_next(&self, count: usize) {
        self.forced_failures.fetch_add(count, Ordering::SeqCst);
    }

    /// Number of stored users, without latency or failures.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Lists the role catalog.
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.simulate("list_roles").await?;
        Ok(ROLES.to_vec())
    }

    /// Waits the simulated latency, then decides whether the call fails.
    async fn simulate(&self, operation: &str) -> Result<()> {
        let (latency_ms, random_failure) = {
            let mut rng = self.rng.lock().await;
            let latency_ms = if self.config.latency_max_ms > self.config.latency_min_ms {
                rng.gen_range(self.config.latency_min_ms..=self.config.latency_max_ms)
            } else {
                self.config.latency_min_ms
            };
            let failure_rate = self.config.failure_rate.clamp(0.0, 1.0);
            (latency_ms, rng.gen_bool(failure_rate))
        };

        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }

        let forced = self
            .forced_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if forced || random_failure {
            tracing::debug!(
                "[MockUserApi] {} failed after {}ms (forced: {})",
                operation,
                latency_ms,
                forced
            );
            return Err(RosterError::service(FAILURE_MESSAGE));
        }

        tracing::debug!("[MockUserApi] {} ok after {}ms", operation, latency_ms);
        Ok(())
    }
}

#[async_trait]
impl RemoteCollection for MockUserApi {
    type Item = User;

    async fn list(&self, query: &Query) -> Result<Page<User>> {
        self.simulate("list").await?;
        let users = self.users.read().await;
        Ok(run_query(&users, query))
    }

    async fn get_by_id(&self, id: &str) -> Result<User> {
        self.simulate("get_by_id").await?;
        let users = self.users.read().await;
        users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| RosterError::not_found(User::ENTITY, id))
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<User>> {
        self.simulate("get_many").await?;
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        self.simulate("list_all").await?;
        Ok(self.users.read().await.clone())
    }

    async fn create(&self, draft: NewUser) -> Result<User> {
        self.simulate("create").await?;
        let id = format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let user = User::from_draft(id, draft);

        let mut users = self.users.write().await;
        users.insert(0, user.clone());
        tracing::debug!("[MockUserApi] Created {}", user.id);

        Ok(user)
    }

    async fn update(&self, id: &str, patch: UserPatch) -> Result<User> {
        self.simulate("update").await?;
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| RosterError::not_found(User::ENTITY, id))?;

        patch.apply_to(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.simulate("delete").await?;
        let mut users = self.users.write().await;
        let index = users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| RosterError::not_found(User::ENTITY, id))?;

        users.remove(index);
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[String]) -> Result<()> {
        self.simulate("bulk_delete").await?;
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|user| !ids.contains(&user.id));
        tracing::debug!(
            "[MockUserApi] Bulk delete removed {} of {} requested",
            before - users.len(),
            ids.len()
        );
        Ok(())
    }
}
