/**
 * FORWARDER TEPS - Push périodique de l'agrégat vers le collecteur amont
 *
 * FONCTIONNEMENT :
 * - Une seule tâche Tokio pour toute la vie du process, réveillée par un ticker
 * - Chaque tick : snapshot du store → enveloppe {tems_name, timestamp, agents}
 *   → un seul POST JSON vers `teps_url`
 * - Best-effort : erreur réseau, timeout ou statut non-2xx = log warn puis on
 *   attend le tick suivant. Pas de retry, pas de file d'attente.
 * - Les envois sont sérialisés : le tick suivant attend la fin du POST en cours,
 *   les ticks manqués sont décalés (pas de rafale).
 * - Chaque POST est borné par `forward_timeout` ; la tâche s'arrête sur signal
 *   de shutdown.
 */

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TemsConfig;
use crate::models::Metric;
use crate::store::MetricStore;

/// Payload envoyé à TEPS
#[derive(Debug, Serialize)]
pub struct ForwardEnvelope {
    pub tems_name: String,
    pub timestamp: i64,
    pub agents: Vec<Metric>,
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream answered {0}")]
    Status(reqwest::StatusCode),
}

pub struct Forwarder {
    store: MetricStore,
    client: reqwest::Client,
    tems_name: String,
    teps_url: String,
    interval: Duration,
}

impl Forwarder {
    pub fn new(cfg: &TemsConfig, store: MetricStore) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.forward_timeout)
            .build()?;

        Ok(Self {
            store,
            client,
            tems_name: cfg.tems_name.clone(),
            teps_url: cfg.teps_url.clone(),
            interval: cfg.interval,
        })
    }

    /// Construit l'enveloppe à partir d'un snapshot ; ordre des agents non garanti
    pub fn envelope(&self) -> ForwardEnvelope {
        ForwardEnvelope {
            tems_name: self.tems_name.clone(),
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
            agents: self.store.snapshot().into_values().collect(),
        }
    }

    /// Un envoi, un seul essai. Retourne le nombre d'agents transmis.
    pub async fn forward_once(&self) -> Result<usize, ForwardError> {
        let envelope = self.envelope();
        let count = envelope.agents.len();

        let response = self.client.post(&self.teps_url).json(&envelope).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }
        Ok(count)
    }

    /// Démarre la boucle ; le premier envoi a lieu un intervalle après le démarrage
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        info!(url = %self.teps_url, interval = ?self.interval, "starting TEPS forwarder");

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if self.store.is_empty() {
                            debug!("no agent reported yet, forwarding empty snapshot");
                        }
                        match self.forward_once().await {
                            Ok(count) => debug!(agents = count, "forwarded snapshot to TEPS"),
                            Err(e) => warn!(error = %e, url = %self.teps_url, "TEPS forward failed, dropping snapshot"),
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("TEPS forwarder stopping");
                        break;
                    }
                }
            }
        })
    }
}
