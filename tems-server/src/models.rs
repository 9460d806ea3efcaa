/**
 * MODÈLES TEMS - Snapshot de métriques par host
 *
 * RÔLE : Format JSON échangé avec les agents (POST /metrics), exposé par
 * GET /api et relayé vers TEPS dans l'enveloppe du forwarder.
 *
 * `network` et `processes` ne sont jamais interprétés ici : on les garde en
 * JSON brut pour ne pas casser les agents qui enrichissent leurs payloads.
 */

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Metric {
    pub hostname: String,
    pub ip: String,
    #[serde(rename = "cpu_percent")]
    pub cpu: f64,
    #[serde(rename = "mem_percent")]
    pub mem: f64,
    #[serde(rename = "disk_percent")]
    pub disk: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub network: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub processes: Vec<Value>,
    /// Epoch secondes, toujours posé par le serveur à la réception
    pub last_seen: i64,
}

/// Clé = hostname
pub type MetricsMap = HashMap<String, Metric>;

// `null` envoyé par un agent = champ vide, pas une erreur de parsing
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
