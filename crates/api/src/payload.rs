//! Alertmanager webhook payload

use alerting::{AlertObservation, Annotations};
use serde::Deserialize;
use std::collections::HashMap;

/// Body of an Alertmanager webhook notification
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookPayload {
    pub receiver: String,
    pub status: String,
    pub alerts: Vec<WebhookAlert>,
    pub common_labels: HashMap<String, String>,
    pub common_annotations: HashMap<String, String>,
    pub version: String,
    pub group_key: String,
    pub truncated_alerts: u64,
}

/// One alert of a webhook notification
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebhookAlert {
    pub labels: HashMap<String, String>,
    pub annotations: WebhookAnnotations,
    pub status: String,
    #[serde(rename = "generatorURL")]
    pub generator_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebhookAnnotations {
    pub summary: String,
    pub description: String,
}

impl WebhookAlert {
    /// The `alertname` label, empty if absent
    pub fn alert_name(&self) -> &str {
        self.labels.get("alertname").map(String::as_str).unwrap_or("")
    }
}

impl From<WebhookAlert> for AlertObservation {
    fn from(mut alert: WebhookAlert) -> Self {
        let key = alert.labels.remove("alertname").unwrap_or_default();
        AlertObservation {
            key,
            status: alert.status,
            annotations: Annotations {
                summary: alert.annotations.summary,
                description: alert.annotations.description,
            },
            generator_url: alert.generator_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "receiver": "relay",
        "status": "firing",
        "alerts": [
            {
                "status": "firing",
                "labels": {"alertname": "Plug Washing Machine", "instance": "plug:9100"},
                "annotations": {"summary": "Washer done", "description": "Power below 2W"},
                "startsAt": "2024-01-01T00:00:00Z",
                "generatorURL": "http://prometheus:9090/graph?g0.expr=power"
            },
            {
                "status": "resolved",
                "labels": {"instance": "other"}
            }
        ],
        "groupLabels": {},
        "commonLabels": {"instance": "plug:9100"},
        "commonAnnotations": {},
        "externalURL": "http://alertmanager:9093",
        "version": "4",
        "groupKey": "{}:{}",
        "truncatedAlerts": 0
    }"#;

    #[test]
    fn test_parse_alertmanager_payload() {
        let payload: WebhookPayload = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(payload.receiver, "relay");
        assert_eq!(payload.version, "4");
        assert_eq!(payload.alerts.len(), 2);
        assert_eq!(payload.alerts[0].alert_name(), "Plug Washing Machine");
        assert_eq!(payload.alerts[1].alert_name(), "");
        assert_eq!(payload.common_labels["instance"], "plug:9100");
    }

    #[test]
    fn test_convert_to_observation() {
        let mut payload: WebhookPayload = serde_json::from_str(SAMPLE).unwrap();
        let obs = AlertObservation::from(payload.alerts.remove(0));

        assert_eq!(obs.key, "Plug Washing Machine");
        assert_eq!(obs.status, "firing");
        assert_eq!(obs.annotations.description, "Power below 2W");
        assert_eq!(obs.generator_url, "http://prometheus:9090/graph?g0.expr=power");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"alerts": [{}]}"#).unwrap();
        let obs = AlertObservation::from(payload.alerts.into_iter().next().unwrap());

        assert!(obs.key.is_empty());
        assert!(obs.status.is_empty());
        assert!(obs.validate().is_err());
    }
}
