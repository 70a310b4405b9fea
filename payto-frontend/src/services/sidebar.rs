//! Per-user cache of the company list shown in the sidebar.
//!
//! Entries expire after a TTL. Every invalidation bumps the entry's
//! generation; a load that started before the bump does not write its
//! result back.

use crate::services::refresh::{RefreshBus, RefreshEvent};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use payto_client::{ApiError, Session};
use payto_core::models::Company;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct Slot {
    generation: u64,
    companies: Option<Vec<Company>>,
    touched: Instant,
}

impl Slot {
    fn fresh(&self, ttl: Duration) -> Option<&Vec<Company>> {
        self.companies
            .as_ref()
            .filter(|_| self.touched.elapsed() < ttl)
    }
}

#[derive(Debug, Clone)]
pub struct SidebarCache {
    slots: Arc<DashMap<String, Slot>>,
    /// Bumped by [`SidebarCache::clear`].
    epoch: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for SidebarCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SidebarCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            epoch: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Cached companies of `user_id`, loading them through `session` on a
    /// miss.
    pub async fn companies(&self, user_id: &str, session: &Session) -> Result<Vec<Company>, ApiError> {
        let epoch = self.epoch.load(Ordering::Acquire);
        let generation = match self.slots.get(user_id) {
            Some(slot) => match slot.fresh(self.ttl) {
                Some(companies) => return Ok(companies.clone()),
                None => slot.generation,
            },
            None => 0,
        };

        let companies = session.companies().list().await?;
        self.store(user_id, generation, epoch, &companies);
        Ok(companies)
    }

    /// Write a loaded list back unless the user was invalidated meanwhile.
    fn store(&self, user_id: &str, generation: u64, epoch: u64, companies: &[Company]) {
        // checked under the shard lock so a concurrent clear wins
        let entry = self.slots.entry(user_id.to_string());
        if self.epoch.load(Ordering::Acquire) != epoch {
            return;
        }
        match entry {
            Entry::Occupied(mut entry) if entry.get().generation == generation => {
                let slot = entry.get_mut();
                slot.companies = Some(companies.to_vec());
                slot.touched = Instant::now();
            }
            Entry::Occupied(_) => {
                tracing::debug!(user_id, "Discarding sidebar load superseded by an invalidation");
            }
            Entry::Vacant(entry) if generation == 0 => {
                entry.insert(Slot {
                    generation,
                    companies: Some(companies.to_vec()),
                    touched: Instant::now(),
                });
            }
            Entry::Vacant(_) => {}
        }
    }

    pub fn cached(&self, user_id: &str) -> Option<Vec<Company>> {
        self.slots
            .get(user_id)
            .and_then(|slot| slot.fresh(self.ttl).cloned())
    }

    pub fn invalidate(&self, user_id: &str) {
        let now = Instant::now();
        self.slots
            .entry(user_id.to_string())
            .and_modify(|slot| {
                slot.generation += 1;
                slot.companies = None;
                slot.touched = now;
            })
            .or_insert(Slot {
                generation: 1,
                companies: None,
                touched: now,
            });
    }

    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.slots.clear();
    }

    /// Drop entries untouched for longer than the TTL.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.slots.retain(|_, slot| slot.touched.elapsed() < ttl);
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Apply refresh events for as long as the bus is alive, sweeping
    /// expired entries once per TTL.
    pub fn listen(&self, bus: &RefreshBus) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        let mut events = bus.subscribe();
        let mut sweep = tokio::time::interval(self.ttl.max(Duration::from_secs(1)));

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Ok(RefreshEvent::CompaniesChanged { user_id }) => {
                            tracing::debug!(user_id = %user_id, "Invalidating sidebar");
                            cache.invalidate(&user_id);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Sidebar listener lagged; clearing cache");
                            cache.clear();
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = sweep.tick() => cache.purge_expired(),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payto_core::TaxCondition;
    use std::time::Duration;
    use uuid::Uuid;

    fn company(name: &str) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            cuit: "30712345671".to_string(),
            tax_condition: TaxCondition::ResponsableInscripto,
            role: None,
            point_of_sale: Some(1),
            created_at: None,
        }
    }

    async fn eventually_empty(cache: &SidebarCache, user_id: &str) -> bool {
        for _ in 0..50 {
            if cache.cached(user_id).is_none() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn companies_changed_invalidates_only_that_user() {
        let bus = RefreshBus::default();
        let cache = SidebarCache::default();
        cache.store("ana", 0, 0, &[company("Acme")]);
        cache.store("beto", 0, 0, &[company("Sur")]);
        let _listener = cache.listen(&bus);

        bus.publish(RefreshEvent::CompaniesChanged {
            user_id: "ana".to_string(),
        });

        assert!(eventually_empty(&cache, "ana").await);
        assert_eq!(cache.cached("beto").map(|c| c.len()), Some(1));
    }

    #[test]
    fn load_started_before_invalidation_is_discarded() {
        let cache = SidebarCache::default();
        // a miss observed generation 0, then the user was invalidated
        cache.invalidate("ana");
        cache.store("ana", 0, 0, &[company("Vieja")]);
        assert!(cache.cached("ana").is_none());

        // a load started after the invalidation is kept
        cache.store("ana", 1, 0, &[company("Vieja"), company("Nueva")]);
        assert_eq!(cache.cached("ana").map(|c| c.len()), Some(2));
    }

    #[test]
    fn load_started_before_clear_is_discarded() {
        let cache = SidebarCache::default();
        cache.clear();
        cache.store("ana", 0, 0, &[company("Acme")]);
        assert!(cache.cached("ana").is_none());
    }

    #[test]
    fn entries_expire_and_are_purged() {
        let cache = SidebarCache::new(Duration::ZERO);
        cache.store("ana", 0, 0, &[company("Acme")]);
        assert!(cache.cached("ana").is_none());

        cache.purge_expired();
        assert!(cache.is_empty());
    }
}
