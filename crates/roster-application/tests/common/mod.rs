#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use roster_core::collection::RemoteCollection;
use roster_core::config::ApiConfig;
use roster_core::error::Result;
use roster_core::query::{Page, Query};
use roster_core::user::{NewUser, User, UserPatch, UserStatus};
use roster_infrastructure::MockUserApi;
use roster_infrastructure::seed::user_at;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Wraps the mock API so tests can hold individual calls open and count
/// how often each operation reached the service.
pub struct GatedCollection {
    pub inner: MockUserApi,
    gates: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl GatedCollection {
    pub fn new(inner: MockUserApi) -> Self {
        Self {
            inner,
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// The next `operation` call waits until the returned sender fires
    /// (or is dropped).
    pub fn hold_next(&self, operation: &'static str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(gate);
        release
    }

    pub fn calls(&self, operation: &'static str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    async fn enter(&self, operation: &'static str) {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(|queue| queue.pop_front());
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl RemoteCollection for GatedCollection {
    type Item = User;

    async fn list(&self, query: &Query) -> Result<Page<User>> {
        self.enter("list").await;
        self.inner.list(query).await
    }

    async fn get_by_id(&self, id: &str) -> Result<User> {
        self.enter("get_by_id").await;
        self.inner.get_by_id(id).await
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<User>> {
        self.enter("get_many").await;
        self.inner.get_many(ids).await
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        self.enter("list_all").await;
        self.inner.list_all().await
    }

    async fn create(&self, draft: NewUser) -> Result<User> {
        self.enter("create").await;
        self.inner.create(draft).await
    }

    async fn update(&self, id: &str, patch: UserPatch) -> Result<User> {
        self.enter("update").await;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.enter("delete").await;
        self.inner.delete(id).await
    }

    async fn bulk_delete(&self, ids: &[String]) -> Result<()> {
        self.enter("bulk_delete").await;
        self.inner.bulk_delete(ids).await
    }
}

/// A mock API with `count` generated users, no latency, no random failures.
pub fn instant_api(count: usize) -> GatedCollection {
    GatedCollection::new(MockUserApi::new(ApiConfig::instant(count)))
}

/// A mock API over explicit `(role, status)` pairs, ids `user-1..`.
pub fn api_with(users: &[(&str, UserStatus)]) -> GatedCollection {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let users = users
        .iter()
        .enumerate()
        .map(|(i, (role, status))| user_at(i + 1, role, *status, "Engineering", day, day))
        .collect();
    GatedCollection::new(MockUserApi::with_users(users, ApiConfig::instant(0)))
}

pub fn new_user(name: &str, email: &str) -> NewUser {
    let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        role: "viewer".to_string(),
        status: UserStatus::Pending,
        department: "Support".to_string(),
        date_joined: day,
        last_login: day,
        avatar: None,
    }
}

pub fn ids(users: &[User]) -> Vec<String> {
    users.iter().map(|user| user.id.clone()).collect()
}
