//! Cached listings and their invalidation keys.
//!
//! A successful mutation invalidates the keys it affects; the next read of
//! an invalidated key refetches from the backend. Subscribers see the most
//! recently invalidated key.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::debug;

/// A cached listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefreshKey {
    Courses,
    Domains { course: String },
    Files { course: String, domain: String },
    Activities,
    Access { course: String },
}

impl RefreshKey {
    pub fn domains(course: &str) -> Self {
        Self::Domains {
            course: course.to_string(),
        }
    }

    pub fn files(course: &str, domain: &str) -> Self {
        Self::Files {
            course: course.to_string(),
            domain: domain.to_string(),
        }
    }

    pub fn access(course: &str) -> Self {
        Self::Access {
            course: course.to_string(),
        }
    }

    /// The course this key is scoped to, if any.
    pub fn course(&self) -> Option<&str> {
        match self {
            Self::Domains { course } | Self::Files { course, .. } | Self::Access { course } => {
                Some(course)
            }
            Self::Courses | Self::Activities => None,
        }
    }
}

type Cached = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Entry {
    generation: u64,
    value: Option<Cached>,
}

pub struct ListCache {
    entries: RwLock<HashMap<RefreshKey, Entry>>,
    notify: watch::Sender<Option<RefreshKey>>,
}

impl Default for ListCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ListCache {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(None);
        Self {
            entries: RwLock::new(HashMap::new()),
            notify,
        }
    }

    /// Times `key` has been invalidated.
    pub fn generation(&self, key: &RefreshKey) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(0, |e| e.generation)
    }

    /// Cached value for `key`, if present and of type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &RefreshKey) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let value = entries.get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    pub fn insert<T: Any + Send + Sync>(&self, key: RefreshKey, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_default().value = Some(value.clone() as Cached);
        value
    }

    /// Return the cached value, or run `fetch` and cache its result.
    ///
    /// A result whose key was invalidated while the fetch ran is returned
    /// but not cached.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: RefreshKey, fetch: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(&key) {
            debug!("Cache hit for {:?}", key);
            return Ok(value);
        }

        let generation = self.generation(&key);
        let value = Arc::new(fetch().await?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(key).or_default();
        if entry.generation == generation {
            entry.value = Some(value.clone() as Cached);
        }
        Ok(value)
    }

    /// Drop the cached value for `key` and notify subscribers.
    pub fn invalidate(&self, key: &RefreshKey) {
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let entry = entries.entry(key.clone()).or_default();
            entry.generation += 1;
            entry.value = None;
        }
        debug!("Invalidated {:?}", key);
        self.notify.send_replace(Some(key.clone()));
    }

    pub fn invalidate_all<'a>(&self, keys: impl IntoIterator<Item = &'a RefreshKey>) {
        for key in keys {
            self.invalidate(key);
        }
    }

    /// Invalidate the course list and every listing scoped to `course`.
    pub fn invalidate_course(&self, course: &str) {
        let scoped: Vec<RefreshKey> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|k| k.course() == Some(course))
            .cloned()
            .collect();
        self.invalidate_all(&scoped);
        self.invalidate(&RefreshKey::Courses);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshKey>> {
        self.notify.subscribe()
    }
}
