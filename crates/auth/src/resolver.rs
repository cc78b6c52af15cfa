//! Role resolver
//!
//! Owns the session state. Consumes identity changes from the identity
//! provider, looks up or seeds the identity's role record, and publishes a
//! `SessionView` for route guards and admin UI.
//!
//! Store failures while resolving never grant elevated access: a failed
//! read resolves to `user`. A failed write keeps only the super-admin
//! designation (which comes from configuration, not the store) and marks
//! the session as not persisted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use energram_common::RepositoryError;
use tokio::sync::watch;

use crate::config::SeedPolicy;
use crate::error::AuthError;
use crate::provider::{IdentityProvider, SignInMethod};
use crate::state::{ResolverEvent, ResolverState, ResolverStateMachine, RoleEvent, RoleStateMachine};
use crate::store::RoleStore;
use crate::types::{Identity, IdentityId, NavigationHint, Role, RoleRecord, SessionView};

struct Inner {
    state: ResolverState,
    identity: Option<Identity>,
}

pub struct RoleResolver {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn RoleStore>,
    policy: SeedPolicy,
    inner: Mutex<Inner>,
    session: watch::Sender<SessionView>,
}

impl RoleResolver {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn RoleStore>,
        policy: SeedPolicy,
    ) -> Self {
        let (session, _) = watch::channel(SessionView::uninitialized());
        Self {
            provider,
            store,
            policy,
            inner: Mutex::new(Inner {
                state: ResolverState::Uninitialized,
                identity: None,
            }),
            session,
        }
    }

    /// Current session projection
    pub fn session(&self) -> SessionView {
        self.session.borrow().clone()
    }

    /// Receiver that observes every published session change
    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.session.subscribe()
    }

    pub fn state(&self) -> ResolverState {
        self.lock().state
    }

    /// Follow the identity provider until it shuts down.
    ///
    /// Resolves the provider's current identity first, then every change.
    pub async fn run(self: Arc<Self>) {
        let mut subscription = self.provider.subscribe();

        let initial = subscription.latest();
        self.identity_changed(initial).await;

        while let Some(identity) = subscription.changed().await {
            self.identity_changed(identity).await;
        }

        tracing::debug!("Identity provider closed its event stream");
    }

    /// Handle an identity-changed notification and return the resulting view
    pub async fn identity_changed(&self, identity: Option<Identity>) -> SessionView {
        let Some(identity) = identity else {
            return self.settle_signed_out();
        };

        if let Some(view) = self.already_resolved(&identity) {
            return view;
        }

        self.begin_resolving(&identity);
        let (role, persisted) = self.resolve_role(&identity).await;
        self.finish_resolving(identity, role, persisted)
    }

    /// Sign in through the provider, resolve the role, and say where to go next.
    ///
    /// A provider failure leaves the session untouched.
    pub async fn sign_in(
        &self,
        method: SignInMethod,
        return_to: Option<&str>,
    ) -> Result<NavigationHint, AuthError> {
        let identity = self.provider.sign_in(method).await.map_err(|e| {
            tracing::warn!(error = %e, "Sign-in failed");
            e
        })?;

        tracing::info!(identity_id = %identity.id, "Signed in");

        let view = self.identity_changed(Some(identity)).await;
        Ok(NavigationHint::after_sign_in(&view, return_to))
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await.map_err(|e| {
            tracing::warn!(error = %e, "Sign-out failed");
            e
        })?;

        self.identity_changed(None).await;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Grant `admin` to a `user`. Super admin only.
    pub async fn promote(&self, target: &IdentityId) -> Result<RoleRecord, AuthError> {
        self.change_role(target, RoleEvent::Promote).await
    }

    /// Revoke `admin` from an admin. Super admin only.
    pub async fn demote(&self, target: &IdentityId) -> Result<RoleRecord, AuthError> {
        self.change_role(target, RoleEvent::Demote).await
    }

    /// Every role record, for the admin-management listing. Super admin only.
    pub async fn list_records(&self) -> Result<Vec<RoleRecord>, AuthError> {
        self.require_super_admin("list role records")?;
        self.store.list().await.map_err(AuthError::store)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(inner: &mut Inner, event: ResolverEvent) {
        match ResolverStateMachine::transition(inner.state, event) {
            Ok(next) => inner.state = next,
            Err(e) => tracing::error!(error = %e, "Resolver rejected provider event"),
        }
    }

    fn settle_signed_out(&self) -> SessionView {
        let mut inner = self.lock();
        Self::apply(&mut inner, ResolverEvent::SignedOut);
        inner.identity = None;

        let view = SessionView::signed_out();
        self.session.send_replace(view.clone());
        view
    }

    /// Repeated notifications for an identity that already has a role are no-ops
    fn already_resolved(&self, identity: &Identity) -> Option<SessionView> {
        let inner = self.lock();
        match (&inner.state, &inner.identity) {
            (ResolverState::Resolved(Some(_)), Some(current)) if current.id == identity.id => {
                Some(self.session())
            }
            _ => None,
        }
    }

    fn begin_resolving(&self, identity: &Identity) {
        let mut inner = self.lock();
        Self::apply(&mut inner, ResolverEvent::SignedIn);
        inner.identity = Some(identity.clone());
        self.session
            .send_replace(SessionView::resolving(identity.clone()));
    }

    fn finish_resolving(&self, identity: Identity, role: Role, persisted: bool) -> SessionView {
        let mut inner = self.lock();

        let is_current = inner
            .identity
            .as_ref()
            .is_some_and(|current| current.id == identity.id);
        if !is_current {
            tracing::debug!(identity_id = %identity.id, "Discarding stale role resolution");
            return self.session();
        }

        match ResolverStateMachine::transition(inner.state, ResolverEvent::RoleResolved(role)) {
            Ok(next) => {
                inner.state = next;
                let view = SessionView::resolved(identity, role, persisted);
                self.session.send_replace(view.clone());
                tracing::info!(identity_id = %view_id(&view), role = %role, persisted, "Session resolved");
                view
            }
            // Another resolution for the same identity finished first
            Err(_) => self.session(),
        }
    }

    async fn resolve_role(&self, identity: &Identity) -> (Role, bool) {
        match self.store.get(&identity.id).await {
            Ok(Some(record)) => (record.role, true),
            Ok(None) => self.seed_record(identity).await,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    identity_id = %identity.id,
                    "Role store read failed, falling back to user"
                );
                (Role::User, false)
            }
        }
    }

    async fn seed_record(&self, identity: &Identity) -> (Role, bool) {
        let seed = self.policy.seed_role(identity.email.as_deref());
        let record = RoleRecord::seeded(identity, seed, Utc::now());

        match self.store.create(record).await {
            Ok(created) => {
                tracing::info!(identity_id = %identity.id, role = %created.role, "Created role record");
                (created.role, true)
            }
            Err(RepositoryError::AlreadyExists) => match self.store.get(&identity.id).await {
                Ok(Some(existing)) => (existing.role, true),
                Ok(None) | Err(_) => {
                    tracing::warn!(identity_id = %identity.id, "Role record vanished after conflict, falling back to user");
                    (Role::User, false)
                }
            },
            Err(e) if seed == Role::SuperAdmin => {
                tracing::warn!(
                    error = %e,
                    identity_id = %identity.id,
                    "Role record write failed, super admin session is not persisted"
                );
                (Role::SuperAdmin, false)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    identity_id = %identity.id,
                    seed_role = %seed,
                    "Role record write failed, falling back to user"
                );
                (Role::User, false)
            }
        }
    }

    fn require_super_admin(&self, action: &str) -> Result<(), AuthError> {
        let session = self.session();
        if session.is_super_admin() {
            return Ok(());
        }

        tracing::warn!(
            identity_id = %view_id(&session),
            action,
            "Rejected admin management by non-super-admin"
        );
        Err(AuthError::Authorization(
            "Only the super admin can manage admins".to_string(),
        ))
    }

    async fn change_role(
        &self,
        target: &IdentityId,
        event: RoleEvent,
    ) -> Result<RoleRecord, AuthError> {
        self.require_super_admin(&event.to_string())?;

        let record = self
            .store
            .get(target)
            .await
            .map_err(AuthError::store)?
            .ok_or_else(|| AuthError::NotFound(target.clone()))?;

        if record.role == Role::SuperAdmin {
            tracing::warn!(identity_id = %target, %event, "Rejected change to super admin record");
            return Err(AuthError::Authorization(
                "The super admin role cannot be changed".to_string(),
            ));
        }

        let next = RoleStateMachine::transition(record.role, event)?;

        let updated = self
            .store
            .update_role(target, next)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::NotFound(target.clone()),
                other => AuthError::store(other),
            })?;

        tracing::info!(identity_id = %target, from = %record.role, to = %updated.role, "Role changed");
        Ok(updated)
    }
}

fn view_id(view: &SessionView) -> String {
    view.identity()
        .map(|identity| identity.id.to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedRule;
    use crate::mock::{InMemoryRoleStore, MockIdentityProvider};

    const SUPER_EMAIL: &str = "super@x.com";

    fn super_identity() -> Identity {
        Identity::new("u1").with_email(SUPER_EMAIL)
    }

    fn random_identity() -> Identity {
        Identity::new("u2")
            .with_email("random@x.com")
            .with_display_name("Random")
            .with_avatar_url("https://cdn.energram.com/a/u2.png")
    }

    fn policy() -> SeedPolicy {
        SeedPolicy::new(Some(SUPER_EMAIL), vec![])
            .unwrap()
            .with_rule(SeedRule::new("ops@x.com", Role::Admin).unwrap())
    }

    fn resolver_with(
        provider: MockIdentityProvider,
        store: InMemoryRoleStore,
    ) -> (Arc<RoleResolver>, MockIdentityProvider, InMemoryRoleStore) {
        let resolver = RoleResolver::new(
            Arc::new(provider.clone()),
            Arc::new(store.clone()),
            policy(),
        );
        (Arc::new(resolver), provider, store)
    }

    fn resolver() -> (Arc<RoleResolver>, MockIdentityProvider, InMemoryRoleStore) {
        resolver_with(MockIdentityProvider::new(), InMemoryRoleStore::new())
    }

    fn federated(id_token: &str) -> SignInMethod {
        SignInMethod::Federated {
            id_token: id_token.to_string(),
        }
    }

    /// Another session creates the record between this session's read and
    /// its create
    struct ConcurrentSignInStore {
        inner: InMemoryRoleStore,
        competing: RoleRecord,
    }

    #[async_trait::async_trait]
    impl RoleStore for ConcurrentSignInStore {
        async fn get(
            &self,
            identity_id: &IdentityId,
        ) -> Result<Option<RoleRecord>, RepositoryError> {
            self.inner.get(identity_id).await
        }

        async fn create(&self, record: RoleRecord) -> Result<RoleRecord, RepositoryError> {
            let _ = self.inner.create(self.competing.clone()).await;
            self.inner.create(record).await
        }

        async fn update_role(
            &self,
            identity_id: &IdentityId,
            role: Role,
        ) -> Result<RoleRecord, RepositoryError> {
            self.inner.update_role(identity_id, role).await
        }

        async fn list(&self) -> Result<Vec<RoleRecord>, RepositoryError> {
            self.inner.list().await
        }
    }

    #[tokio::test]
    async fn test_starts_uninitialized_and_loading() {
        let (resolver, _, _) = resolver();
        assert_eq!(resolver.state(), ResolverState::Uninitialized);
        assert!(resolver.session().is_loading());
    }

    #[tokio::test]
    async fn test_super_admin_email_seeds_super_admin() {
        let (resolver, _, store) = resolver();

        let view = resolver.identity_changed(Some(super_identity())).await;

        assert_eq!(view.role(), Some(Role::SuperAdmin));
        assert!(view.is_admin());
        assert!(view.is_super_admin());
        assert!(view.is_persisted());
        assert_eq!(
            store.record(&IdentityId::new("u1")).map(|r| r.role),
            Some(Role::SuperAdmin)
        );
    }

    #[tokio::test]
    async fn test_unknown_email_seeds_user_with_identity_fields() {
        let (resolver, _, store) = resolver();

        let view = resolver.identity_changed(Some(random_identity())).await;

        assert_eq!(view.role(), Some(Role::User));
        assert!(!view.is_admin());
        let record = store.record(&IdentityId::new("u2")).unwrap();
        assert_eq!(record.email.as_deref(), Some("random@x.com"));
        assert_eq!(record.display_name.as_deref(), Some("Random"));
        assert_eq!(
            record.avatar_url.as_deref(),
            Some("https://cdn.energram.com/a/u2.png")
        );
    }

    #[tokio::test]
    async fn test_second_resolution_does_not_duplicate_record() {
        let (resolver, _, store) = resolver();

        resolver.identity_changed(Some(random_identity())).await;
        resolver.identity_changed(None).await;
        resolver.identity_changed(Some(random_identity())).await;

        assert_eq!(store.record_count(), 1);
        assert_eq!(store.create_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_notification_does_not_touch_store() {
        let (resolver, _, store) = resolver();
        let first = resolver.identity_changed(Some(random_identity())).await;
        let reads = store.read_count();
        let creates = store.create_count();

        let repeated = resolver.identity_changed(Some(random_identity())).await;

        assert_eq!(repeated, first);
        assert_eq!(store.read_count(), reads);
        assert_eq!(store.create_count(), creates);
        assert_eq!(resolver.state(), ResolverState::Resolved(Some(Role::User)));
    }

    #[tokio::test]
    async fn test_concurrent_first_sign_in_adopts_stored_role() {
        let ops = Identity::new("u3").with_email("ops@x.com");
        let inner = InMemoryRoleStore::new();
        let store = ConcurrentSignInStore {
            inner: inner.clone(),
            competing: RoleRecord::seeded(&ops, Role::User, Utc::now()),
        };
        let resolver = RoleResolver::new(
            Arc::new(MockIdentityProvider::new()),
            Arc::new(store),
            policy(),
        );

        let view = resolver.identity_changed(Some(ops)).await;

        // The seed policy says admin, the record written first says user
        assert_eq!(view.role(), Some(Role::User));
        assert!(view.is_persisted());
        assert_eq!(inner.record_count(), 1);
        assert_eq!(inner.create_count(), 1);
        // Initial read plus the re-read after the conflict
        assert_eq!(inner.read_count(), 2);
    }

    #[tokio::test]
    async fn test_existing_record_wins_over_seed_policy() {
        let demoted_ops = RoleRecord::seeded(
            &Identity::new("u3").with_email("ops@x.com"),
            Role::User,
            Utc::now(),
        );
        let (resolver, _, store) = resolver_with(
            MockIdentityProvider::new(),
            InMemoryRoleStore::new().with_record(demoted_ops),
        );

        let view = resolver
            .identity_changed(Some(Identity::new("u3").with_email("ops@x.com")))
            .await;

        assert_eq!(view.role(), Some(Role::User));
        assert_eq!(store.create_count(), 0);
    }

    #[tokio::test]
    async fn test_read_failure_fails_closed() {
        let (resolver, _, store) = resolver();
        store.set_fail_reads(true);

        let view = resolver.identity_changed(Some(super_identity())).await;

        assert_eq!(view.role(), Some(Role::User));
        assert!(!view.is_admin());
        assert!(!view.is_super_admin());
        assert!(!view.is_persisted());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_write_failure_for_regular_seed_fails_closed() {
        let (resolver, _, store) = resolver();
        store.set_fail_writes(true);

        let view = resolver
            .identity_changed(Some(Identity::new("u4").with_email("ops@x.com")))
            .await;

        assert_eq!(view.role(), Some(Role::User));
        assert!(!view.is_persisted());
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_super_admin_unpersisted() {
        let (resolver, _, store) = resolver();
        store.set_fail_writes(true);

        let view = resolver.identity_changed(Some(super_identity())).await;

        assert_eq!(view.role(), Some(Role::SuperAdmin));
        assert!(view.is_super_admin());
        assert!(!view.is_persisted());
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let (resolver, _, _) = resolver();
        resolver.identity_changed(Some(super_identity())).await;

        let view = resolver.identity_changed(None).await;

        assert_eq!(view, SessionView::signed_out());
        assert_eq!(resolver.state(), ResolverState::Resolved(None));
    }

    #[tokio::test]
    async fn test_provider_events_drive_the_state_machine() {
        let (resolver, _, _) = resolver();

        resolver.begin_resolving(&random_identity());
        assert_eq!(resolver.state(), ResolverState::Resolving);

        resolver.settle_signed_out();
        assert_eq!(resolver.state(), ResolverState::Resolved(None));

        // Signed out, a new identity restarts resolution
        resolver.begin_resolving(&super_identity());
        assert_eq!(resolver.state(), ResolverState::Resolving);
        assert!(resolver.session().is_loading());
    }

    #[tokio::test]
    async fn test_stale_resolution_is_discarded() {
        let (resolver, _, _) = resolver();

        resolver.begin_resolving(&random_identity());
        resolver.begin_resolving(&super_identity());
        let view = resolver.finish_resolving(random_identity(), Role::User, true);

        assert!(view.is_loading());
        assert_eq!(view.identity().map(|i| i.id.clone()), Some(IdentityId::new("u1")));
        assert_eq!(resolver.state(), ResolverState::Resolving);
    }

    #[tokio::test]
    async fn test_sign_in_hint_for_admin_and_user() {
        let provider = MockIdentityProvider::new()
            .with_account("pw", super_identity())
            .with_federated("random-token", random_identity());
        let (resolver, _, _) = resolver_with(provider, InMemoryRoleStore::new());

        let hint = resolver
            .sign_in(
                SignInMethod::Password {
                    email: SUPER_EMAIL.to_string(),
                    password: "pw".to_string(),
                },
                Some("/pricing"),
            )
            .await
            .unwrap();
        assert_eq!(hint, NavigationHint::AdminArea);

        resolver.sign_out().await.unwrap();

        let hint = resolver
            .sign_in(federated("random-token"), Some("/order"))
            .await
            .unwrap();
        assert_eq!(hint, NavigationHint::ReturnTo("/order".to_string()));
    }

    #[tokio::test]
    async fn test_failed_sign_in_leaves_session_untouched() {
        let provider = MockIdentityProvider::new().with_federated("random-token", random_identity());
        let (resolver, provider, _) = resolver_with(provider, InMemoryRoleStore::new());
        resolver.identity_changed(None).await;
        provider.fail_next("Popup closed by user");

        let result = resolver.sign_in(federated("random-token"), None).await;

        assert!(matches!(result, Err(AuthError::IdentityProvider(_))));
        assert_eq!(resolver.session(), SessionView::signed_out());
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_session() {
        let provider = MockIdentityProvider::new().with_federated("random-token", random_identity());
        let (resolver, provider, _) = resolver_with(provider, InMemoryRoleStore::new());
        resolver
            .sign_in(federated("random-token"), None)
            .await
            .unwrap();
        provider.fail_next("Network request failed");

        assert!(resolver.sign_out().await.is_err());
        assert_eq!(resolver.session().role(), Some(Role::User));
    }

    #[tokio::test]
    async fn test_promote_by_super_admin_then_resolves_admin() {
        let (resolver, provider, store) = resolver();
        resolver.identity_changed(Some(random_identity())).await;
        resolver.identity_changed(Some(super_identity())).await;

        let updated = resolver.promote(&IdentityId::new("u2")).await.unwrap();
        assert_eq!(updated.role, Role::Admin);

        let (other_session, _, _) = resolver_with(provider, store);
        let view = other_session.identity_changed(Some(random_identity())).await;
        assert!(view.is_admin());
        assert!(!view.is_super_admin());
    }

    #[tokio::test]
    async fn test_demote_admin() {
        let admin = RoleRecord::seeded(&random_identity(), Role::Admin, Utc::now());
        let (resolver, _, store) =
            resolver_with(MockIdentityProvider::new(), InMemoryRoleStore::new().with_record(admin));
        resolver.identity_changed(Some(super_identity())).await;

        let updated = resolver.demote(&IdentityId::new("u2")).await.unwrap();

        assert_eq!(updated.role, Role::User);
        assert_eq!(store.record(&IdentityId::new("u2")).unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_non_super_admin_cannot_change_roles() {
        let admin = RoleRecord::seeded(&random_identity(), Role::Admin, Utc::now());
        let target = RoleRecord::seeded(&Identity::new("u5"), Role::User, Utc::now());
        let (resolver, _, store) = resolver_with(
            MockIdentityProvider::new(),
            InMemoryRoleStore::new().with_record(admin).with_record(target),
        );
        resolver.identity_changed(Some(random_identity())).await;

        let promote = resolver.promote(&IdentityId::new("u5")).await;
        let demote = resolver.demote(&IdentityId::new("u2")).await;

        assert!(matches!(promote, Err(AuthError::Authorization(_))));
        assert!(matches!(demote, Err(AuthError::Authorization(_))));
        assert_eq!(store.record(&IdentityId::new("u5")).unwrap().role, Role::User);
        assert_eq!(store.record(&IdentityId::new("u2")).unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_signed_out_caller_cannot_change_roles() {
        let (resolver, _, _) = resolver();
        let result = resolver.promote(&IdentityId::new("u2")).await;
        assert!(matches!(result, Err(AuthError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_super_admin_record_is_immutable() {
        let (resolver, _, store) = resolver();
        resolver.identity_changed(Some(super_identity())).await;

        for result in [
            resolver.promote(&IdentityId::new("u1")).await,
            resolver.demote(&IdentityId::new("u1")).await,
        ] {
            assert!(matches!(result, Err(AuthError::Authorization(_))));
        }
        assert_eq!(
            store.record(&IdentityId::new("u1")).unwrap().role,
            Role::SuperAdmin
        );
    }

    #[tokio::test]
    async fn test_redundant_and_missing_targets() {
        let (resolver, _, _) = resolver();
        resolver.identity_changed(Some(random_identity())).await;
        resolver.identity_changed(Some(super_identity())).await;

        let redundant = resolver.demote(&IdentityId::new("u2")).await;
        assert!(matches!(redundant, Err(AuthError::InvalidTransition(_))));

        let missing = resolver.promote(&IdentityId::new("ghost")).await;
        assert!(matches!(missing, Err(AuthError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_role_change_store_failure_surfaces() {
        let (resolver, _, store) = resolver();
        resolver.identity_changed(Some(random_identity())).await;
        resolver.identity_changed(Some(super_identity())).await;
        store.set_fail_writes(true);

        let result = resolver.promote(&IdentityId::new("u2")).await;

        assert!(matches!(result, Err(AuthError::RoleStoreUnavailable(_))));
        assert_eq!(store.record(&IdentityId::new("u2")).unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_list_records_requires_super_admin() {
        let (resolver, _, _) = resolver();
        resolver.identity_changed(Some(random_identity())).await;
        assert!(matches!(
            resolver.list_records().await,
            Err(AuthError::Authorization(_))
        ));

        resolver.identity_changed(Some(super_identity())).await;
        let records = resolver.list_records().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_run_follows_provider_events() {
        let (resolver, provider, _) = resolver();
        let mut sessions = resolver.watch();

        let task = tokio::spawn(resolver.clone().run());

        sessions
            .wait_for(|view| !view.is_loading() && view.identity().is_none())
            .await
            .unwrap();

        provider.emit(Some(super_identity()));
        sessions
            .wait_for(|view| view.is_super_admin())
            .await
            .unwrap();

        provider.emit(None);
        sessions
            .wait_for(|view| !view.is_loading() && view.identity().is_none())
            .await
            .unwrap();

        drop(provider);
        task.abort();
    }
}
