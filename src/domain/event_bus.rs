//! In-process publish/subscribe bus for real-time notifications.
//!
//! [`EventBus`] pairs a [`tokio::sync::broadcast`] channel (delivery) with
//! a membership table (who is connected and which groups they joined).
//! Each connection joins exactly two groups on connect: its role group
//! (`HR` / `USER`) and its identity group (`user-<id>`).
//!
//! Delivery is best-effort and at-most-once. Nothing is queued for
//! connections that join later, and a listener that falls more than the
//! channel capacity behind loses the oldest events.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use super::{ConnectionId, PortalEvent};
use crate::auth::{Principal, TokenService};
use crate::error::PortalError;

/// Who an event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every connected listener, regardless of group.
    Everyone,
    /// Only members of the named group.
    Group(String),
}

/// An event in flight on the broadcast channel.
#[derive(Debug, Clone)]
struct Delivery {
    audience: Audience,
    event: PortalEvent,
}

impl Delivery {
    fn is_for(&self, groups: &[String]) -> bool {
        match &self.audience {
            Audience::Everyone => true,
            Audience::Group(name) => groups.iter().any(|g| g == name),
        }
    }
}

/// Connected principals and group membership.
#[derive(Debug, Default)]
struct Membership {
    connections: HashMap<ConnectionId, Principal>,
    groups: HashMap<String, HashSet<ConnectionId>>,
}

/// Broadcast bus for [`PortalEvent`]s.
///
/// Cheap to clone; all clones share the same channel and membership table.
/// Constructed once at startup and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Delivery>,
    membership: Arc<RwLock<Membership>>,
}

impl EventBus {
    /// Largest accepted channel capacity.
    pub const MAX_CAPACITY: usize = 1 << 16;

    /// Creates a new `EventBus` with the given channel capacity, clamped to
    /// `1..=MAX_CAPACITY`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, Self::MAX_CAPACITY));
        Self {
            sender,
            membership: Arc::new(RwLock::new(Membership::default())),
        }
    }

    /// Runs the identity gate on `credential` and, on success, registers a
    /// new connection in its role and identity groups.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Unauthorized`] if the credential is missing or
    /// invalid. No connection or group membership is created in that case.
    pub async fn connect(
        &self,
        gate: &TokenService,
        credential: Option<&str>,
    ) -> Result<ConnectionHandle, PortalError> {
        let principal = gate
            .verify_credential(credential)
            .inspect_err(|e| tracing::warn!(error = %e, "real-time connection refused"))?;
        Ok(self.join(principal).await)
    }

    /// Registers an already-verified principal.
    pub async fn join(&self, principal: Principal) -> ConnectionHandle {
        let id = ConnectionId::new();
        let groups = vec![
            principal.role_group().to_string(),
            principal.identity_group(),
        ];

        let mut membership = self.membership.write().await;
        // Subscribe under the lock so the handle sees everything published
        // after `connect` returns and nothing published before.
        let receiver = self.sender.subscribe();
        membership.connections.insert(id, principal);
        for group in &groups {
            membership.groups.entry(group.clone()).or_default().insert(id);
        }
        drop(membership);

        tracing::info!(connection = %id, user = %principal.id, role = %principal.role, "listener connected");
        ConnectionHandle {
            id,
            principal,
            groups,
            receiver: Some(receiver),
        }
    }

    /// Publishes an event to every connected listener.
    ///
    /// Never blocks and never fails. Returns the number of receivers the
    /// event was handed to; with no listeners the event is dropped and `0`
    /// is returned.
    pub fn publish(&self, event: PortalEvent) -> usize {
        self.send(Audience::Everyone, event)
    }

    /// Publishes an event to members of `group` only.
    ///
    /// The returned count is of channel receivers, not group members;
    /// non-members discard the event on receipt.
    pub fn publish_to_group(&self, group: impl Into<String>, event: PortalEvent) -> usize {
        self.send(Audience::Group(group.into()), event)
    }

    fn send(&self, audience: Audience, event: PortalEvent) -> usize {
        let name = event.name();
        let delivered = self.sender.send(Delivery { audience, event }).unwrap_or(0);
        tracing::debug!(event = name, receivers = delivered, "event published");
        delivered
    }

    /// Disconnects `handle`: drops its receiver and removes its group
    /// memberships. Idempotent.
    ///
    /// Returns `true` if the handle was connected.
    pub async fn disconnect(&self, handle: &mut ConnectionHandle) -> bool {
        handle.receiver = None;
        self.evict(handle.id).await
    }

    /// Removes the membership records for `id`. Idempotent.
    ///
    /// Used when the handle itself is already gone, e.g. after a failed
    /// WebSocket upgrade. Returns `true` if anything was removed.
    pub async fn evict(&self, id: ConnectionId) -> bool {
        let mut membership = self.membership.write().await;
        let Some(principal) = membership.connections.remove(&id) else {
            return false;
        };
        membership.groups.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
        drop(membership);

        tracing::info!(connection = %id, user = %principal.id, "listener disconnected");
        true
    }

    /// Returns the connections currently in `group`.
    pub async fn members_of(&self, group: &str) -> HashSet<ConnectionId> {
        self.membership
            .read()
            .await
            .groups
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the names of the groups `id` belongs to, sorted.
    pub async fn groups_of(&self, id: ConnectionId) -> Vec<String> {
        let membership = self.membership.read().await;
        let mut names: Vec<String> = membership
            .groups
            .iter()
            .filter(|(_, members)| members.contains(&id))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Returns the number of connected listeners.
    pub async fn connection_count(&self) -> usize {
        self.membership.read().await.connections.len()
    }
}

/// A live registration on the bus, owned by the task serving one client.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    principal: Principal,
    groups: Vec<String>,
    receiver: Option<broadcast::Receiver<Delivery>>,
}

impl ConnectionHandle {
    /// Connection identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Principal the connection authenticated as.
    #[must_use]
    pub const fn principal(&self) -> Principal {
        self.principal
    }

    /// Groups joined on connect.
    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Returns `true` until the handle is disconnected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.receiver.is_some()
    }

    /// Waits for the next event addressed to this connection.
    ///
    /// # Errors
    ///
    /// [`RecvError::Lagged`] if events were dropped because this listener
    /// fell behind (the caller may keep receiving), or
    /// [`RecvError::Closed`] once the handle is disconnected.
    pub async fn recv(&mut self) -> Result<PortalEvent, RecvError> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Err(RecvError::Closed);
        };
        loop {
            let delivery = receiver.recv().await?;
            if delivery.is_for(&self.groups) {
                return Ok(delivery.event);
            }
        }
    }

    /// Non-blocking variant of [`ConnectionHandle::recv`].
    ///
    /// # Errors
    ///
    /// [`TryRecvError::Empty`] when nothing is pending, otherwise as
    /// [`ConnectionHandle::recv`].
    pub fn try_recv(&mut self) -> Result<PortalEvent, TryRecvError> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Err(TryRecvError::Closed);
        };
        loop {
            let delivery = receiver.try_recv()?;
            if delivery.is_for(&self.groups) {
                return Ok(delivery.event);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Duration, Utc};
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::auth::TokenConfig;
    use crate::domain::{Job, JobId, JobStatus, Role, UserId};

    fn gate() -> TokenService {
        TokenService::new(&TokenConfig {
            secret: "bus-test".to_string(),
            issuer: "job-portal".to_string(),
            ttl: Duration::hours(1),
        })
    }

    fn token(gate: &TokenService, id: i64, role: Role) -> String {
        let principal = Principal::new(UserId::new(id), role);
        let Ok(token) = gate.issue_with_ttl(principal, "x@example.com", Duration::hours(1)) else {
            panic!("token issuance failed");
        };
        token
    }

    fn expired_event(id: i64) -> PortalEvent {
        PortalEvent::job_expired(&Job {
            id: JobId::new(id),
            title: format!("Job {id}"),
            description: String::new(),
            salary: String::new(),
            location: String::new(),
            status: JobStatus::Expired,
            posted_by: UserId::new(1),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn connect_joins_role_and_identity_groups() {
        let gate = gate();
        let bus = EventBus::new(16);
        let t = token(&gate, 7, Role::Hr);

        let handle = assert_ok!(bus.connect(&gate, Some(&t)).await);
        assert_eq!(handle.principal().id, UserId::new(7));
        assert_eq!(bus.groups_of(handle.id()).await, vec!["HR", "user-7"]);
        assert!(bus.members_of("HR").await.contains(&handle.id()));
        assert!(bus.members_of("USER").await.is_empty());
        assert_eq!(bus.connection_count().await, 1);
    }

    #[tokio::test]
    async fn invalid_credentials_create_no_membership() {
        let gate = gate();
        let bus = EventBus::new(16);
        let expired = {
            let principal = Principal::new(UserId::new(3), Role::User);
            let Ok(t) = gate.issue_with_ttl(principal, "x@example.com", Duration::hours(-3)) else {
                panic!("token issuance failed");
            };
            t
        };

        assert_err!(bus.connect(&gate, None).await);
        assert_err!(bus.connect(&gate, Some("garbage")).await);
        assert_err!(bus.connect(&gate, Some(&expired)).await);
        assert_eq!(bus.connection_count().await, 0);
        assert!(bus.members_of("USER").await.is_empty());
        assert!(bus.members_of("user-3").await.is_empty());
    }

    #[test]
    fn publish_without_listeners_is_dropped() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(expired_event(1)), 0);
    }

    #[tokio::test]
    async fn extreme_capacities_are_clamped() {
        let gate = gate();
        for capacity in [0, usize::MAX] {
            let bus = EventBus::new(capacity);
            let t = token(&gate, 2, Role::User);
            let mut handle = assert_ok!(bus.connect(&gate, Some(&t)).await);
            assert_eq!(bus.publish(expired_event(5)), 1, "capacity {capacity}");
            let event = assert_ok!(handle.recv().await);
            assert_eq!(event.job_id(), JobId::new(5));
        }
    }

    #[tokio::test]
    async fn late_listener_sees_nothing_from_before() {
        let gate = gate();
        let bus = EventBus::new(16);
        bus.publish(expired_event(1));

        let t = token(&gate, 2, Role::User);
        let mut handle = assert_ok!(bus.connect(&gate, Some(&t)).await);
        assert!(matches!(handle.try_recv(), Err(TryRecvError::Empty)));

        bus.publish(expired_event(2));
        let event = assert_ok!(handle.recv().await);
        assert_eq!(event.job_id(), JobId::new(2));
    }

    #[tokio::test]
    async fn publish_reaches_every_group() {
        let gate = gate();
        let bus = EventBus::new(16);
        let mut hr = assert_ok!(bus.connect(&gate, Some(&token(&gate, 1, Role::Hr))).await);
        let mut seeker = assert_ok!(bus.connect(&gate, Some(&token(&gate, 2, Role::User))).await);

        assert_eq!(bus.publish(expired_event(9)), 2);
        assert_eq!(assert_ok!(hr.recv().await).job_id(), JobId::new(9));
        assert_eq!(assert_ok!(seeker.recv().await).job_id(), JobId::new(9));
    }

    #[tokio::test]
    async fn group_publish_is_filtered() {
        let gate = gate();
        let bus = EventBus::new(16);
        let mut owner = assert_ok!(bus.connect(&gate, Some(&token(&gate, 1, Role::Hr))).await);
        let mut other = assert_ok!(bus.connect(&gate, Some(&token(&gate, 2, Role::Hr))).await);

        bus.publish_to_group("user-1", expired_event(4));
        assert_eq!(assert_ok!(owner.recv().await).job_id(), JobId::new(4));
        assert!(matches!(other.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let gate = gate();
        let bus = EventBus::new(16);
        let mut handle = assert_ok!(bus.connect(&gate, Some(&token(&gate, 5, Role::User))).await);

        assert!(bus.disconnect(&mut handle).await);
        assert!(!bus.disconnect(&mut handle).await);
        assert!(!handle.is_connected());
        assert_eq!(bus.connection_count().await, 0);
        assert!(bus.members_of("user-5").await.is_empty());

        bus.publish(expired_event(1));
        assert!(matches!(handle.recv().await, Err(RecvError::Closed)));
    }

    #[tokio::test]
    async fn reconnect_gets_fresh_connection() {
        let gate = gate();
        let bus = EventBus::new(16);
        let t = token(&gate, 6, Role::User);
        let mut first = assert_ok!(bus.connect(&gate, Some(&t)).await);
        bus.disconnect(&mut first).await;

        let second = assert_ok!(bus.connect(&gate, Some(&t)).await);
        assert_ne!(first.id(), second.id());
        assert_eq!(bus.members_of("user-6").await.len(), 1);
    }

    #[tokio::test]
    async fn evict_without_handle() {
        let gate = gate();
        let bus = EventBus::new(16);
        let handle = assert_ok!(bus.connect(&gate, Some(&token(&gate, 8, Role::Hr))).await);
        let id = handle.id();
        drop(handle);

        assert!(bus.evict(id).await);
        assert!(!bus.evict(id).await);
        assert_eq!(bus.connection_count().await, 0);
    }
}
