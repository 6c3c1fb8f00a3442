use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    domain::{ChatId, UserId},
    errors::Error,
    formatting::broadcast_message_html,
    intent::USAGE_BROADCAST,
    messaging::port::MessagingPort,
    Result,
};

/// Users allowed to broadcast. Built once at startup, never mutated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminSet(HashSet<UserId>);

impl AdminSet {
    pub fn new(ids: impl IntoIterator<Item = UserId>) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Parse a comma-separated id list, returning the set and the entries that were dropped.
    pub fn parse_csv(raw: &str) -> (Self, Vec<String>) {
        let mut ids = HashSet::new();
        let mut rejected = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match part.parse::<i64>() {
                Ok(id) => {
                    ids.insert(UserId(id));
                }
                Err(_) => rejected.push(part.to_string()),
            }
        }
        (Self(ids), rejected)
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.0.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Every user seen so far; only grows.
#[derive(Debug, Default)]
pub struct KnownUsers {
    inner: Mutex<BTreeSet<UserId>>,
}

impl KnownUsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the user was not known before.
    pub async fn insert(&self, user: UserId) -> bool {
        self.inner.lock().await.insert(user)
    }

    pub async fn snapshot(&self) -> Vec<UserId> {
        self.inner.lock().await.iter().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Admin check plus failure-tolerant fan-out.
pub struct Broadcaster {
    admins: AdminSet,
    messenger: Arc<dyn MessagingPort>,
}

impl Broadcaster {
    pub fn new(admins: AdminSet, messenger: Arc<dyn MessagingPort>) -> Self {
        Self { admins, messenger }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(user)
    }

    /// Send `body` to every known user.
    ///
    /// Non-admins get [`Error::Unauthorized`] before anything is sent. Individual delivery
    /// failures are counted in the report and never stop the batch.
    pub async fn broadcast(
        &self,
        requester: UserId,
        body: &str,
        known: &KnownUsers,
    ) -> Result<DeliveryReport> {
        if !self.is_admin(requester) {
            warn!(user_id = requester.0, "broadcast refused: not an admin");
            return Err(Error::Unauthorized);
        }
        if body.trim().is_empty() {
            return Err(Error::malformed(USAGE_BROADCAST));
        }

        let html = broadcast_message_html(body);
        let recipients = known.snapshot().await;
        let mut report = DeliveryReport {
            attempted: recipients.len(),
            ..DeliveryReport::default()
        };

        for user in recipients {
            match self.messenger.send_html(ChatId::from(user), &html).await {
                Ok(_) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(user_id = user.0, error = %e, "broadcast delivery failed");
                }
            }
        }

        info!(
            admin_id = requester.0,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            "broadcast finished"
        );
        Ok(report)
    }
}
