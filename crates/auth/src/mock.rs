//! In-memory identity provider and role store
//!
//! Used by tests, and by the local server when it is explicitly started with
//! the development identity provider. Both support failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use energram_common::RepositoryError;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::provider::{
    IdentityProvider, IdentityProviderFactory, IdentitySubscription, SignInMethod,
};
use crate::store::RoleStore;
use crate::types::{Identity, IdentityId, Role, RoleRecord};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
struct MockAccount {
    password: String,
    identity: Identity,
}

/// Mock identity provider with password accounts and federated ID tokens.
///
/// Clones share everything. [`IdentityProviderFactory::open`] shares the
/// accounts and failure injection but starts a separate signed-out session.
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    accounts: Arc<Mutex<HashMap<String, MockAccount>>>,
    federated: Arc<Mutex<HashMap<String, Identity>>>,
    fail_next: Arc<Mutex<Option<String>>>,
    current: Arc<watch::Sender<Option<Identity>>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            federated: Arc::new(Mutex::new(HashMap::new())),
            fail_next: Arc::new(Mutex::new(None)),
            current: Arc::new(sender),
        }
    }

    /// Register a password account. The identity's email is the login.
    pub fn with_account(self, password: &str, identity: Identity) -> Self {
        let login = identity.email.clone().unwrap_or_default().to_lowercase();
        lock(&self.accounts).insert(
            login,
            MockAccount {
                password: password.to_string(),
                identity,
            },
        );
        self
    }

    /// Accept `id_token` as a federated sign-in for `identity`
    pub fn with_federated(self, id_token: &str, identity: Identity) -> Self {
        lock(&self.federated).insert(id_token.to_string(), identity);
        self
    }

    /// Make the next sign-in or sign-out fail with this message
    pub fn fail_next(&self, message: &str) {
        *lock(&self.fail_next) = Some(message.to_string());
    }

    /// Simulate a change that did not come through this adapter
    /// (session restored, token revoked elsewhere)
    pub fn emit(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn take_failure(&self) -> Option<AuthError> {
        lock(&self.fail_next).take().map(AuthError::IdentityProvider)
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn subscribe(&self) -> IdentitySubscription {
        IdentitySubscription::new(self.current.subscribe())
    }

    async fn sign_in(&self, method: SignInMethod) -> Result<Identity, AuthError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let identity = match method {
            SignInMethod::Federated { id_token } => lock(&self.federated)
                .get(&id_token)
                .cloned()
                .ok_or_else(|| AuthError::IdentityProvider("Invalid ID token".to_string()))?,
            SignInMethod::Password { email, password } => {
                let accounts = lock(&self.accounts);
                match accounts.get(&email.trim().to_lowercase()) {
                    Some(account) if account.password == password => account.identity.clone(),
                    _ => {
                        return Err(AuthError::IdentityProvider(
                            "Invalid email or password".to_string(),
                        ))
                    }
                }
            }
        };

        tracing::info!(identity_id = %identity.id, "Mock identity provider signed in");
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        self.current.send_replace(None);
        Ok(())
    }
}

impl IdentityProviderFactory for MockIdentityProvider {
    fn open(&self) -> Arc<dyn IdentityProvider> {
        let (sender, _) = watch::channel(None);
        Arc::new(Self {
            accounts: self.accounts.clone(),
            federated: self.federated.clone(),
            fail_next: self.fail_next.clone(),
            current: Arc::new(sender),
        })
    }
}

/// In-memory role store
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleStore {
    records: Arc<Mutex<HashMap<IdentityId, RoleRecord>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    creates: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record, bypassing the create counter
    pub fn with_record(self, record: RoleRecord) -> Self {
        lock(&self.records).insert(record.identity_id.clone(), record);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn record(&self, identity_id: &IdentityId) -> Option<RoleRecord> {
        lock(&self.records).get(identity_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        lock(&self.records).len()
    }

    /// Number of successful creates
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of `get` and `list` calls, failed ones included
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), RepositoryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "role store read failed".to_string(),
            ));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "role store write failed".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get(&self, identity_id: &IdentityId) -> Result<Option<RoleRecord>, RepositoryError> {
        self.check_reads()?;
        Ok(self.record(identity_id))
    }

    async fn create(&self, record: RoleRecord) -> Result<RoleRecord, RepositoryError> {
        self.check_writes()?;

        let mut records = lock(&self.records);
        if records.contains_key(&record.identity_id) {
            return Err(RepositoryError::AlreadyExists);
        }
        records.insert(record.identity_id.clone(), record.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn update_role(
        &self,
        identity_id: &IdentityId,
        role: Role,
    ) -> Result<RoleRecord, RepositoryError> {
        self.check_writes()?;

        let mut records = lock(&self.records);
        let record = records
            .get_mut(identity_id)
            .ok_or(RepositoryError::NotFound)?;
        record.role = role;
        Ok(record.clone())
    }

    async fn list(&self) -> Result<Vec<RoleRecord>, RepositoryError> {
        self.check_reads()?;

        let mut records: Vec<RoleRecord> = lock(&self.records).values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.identity_id.cmp(&b.identity_id))
        });
        Ok(records)
    }
}
