use crate::models::{Metric, MetricsMap};
use parking_lot::RwLock;
use std::sync::Arc;

/// Dernier snapshot connu par hostname, partagé entre handlers HTTP et forwarder.
///
/// Les écritures prennent le verrou exclusif, les lectures le verrou partagé ;
/// le verrou n'est jamais tenu à travers un `.await`. Aucune éviction.
#[derive(Clone, Default)]
pub struct MetricStore {
    inner: Arc<RwLock<MetricsMap>>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace l'entrée existante pour ce hostname (last-write-wins)
    pub fn upsert(&self, hostname: String, metric: Metric) {
        self.inner.write().insert(hostname, metric);
    }

    /// Copie cohérente de tout le store à un instant donné
    pub fn snapshot(&self) -> MetricsMap {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
