// Workspace resources exposed through paged listings

use serde::{Deserialize, Serialize};

/// Usage quota for one provider dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    pub dimension: String,
    pub scope: String,
    pub provider_id: String,
    pub utilization: f64,
    pub holds: f64,
    pub limit: f64,
    pub period: String,
}

impl Quota {
    /// Remaining capacity after current utilization and holds
    pub fn remaining(&self) -> f64 {
        (self.limit - self.utilization - self.holds).max(0.0)
    }
}

/// Availability of a provider and its targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub id: String,
    pub current_availability: String,
    #[serde(default)]
    pub targets: Vec<TargetStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub id: String,
    pub current_availability: String,
    /// Seconds
    #[serde(default)]
    pub average_queue_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quota_remaining_never_negative() {
        let quota = Quota {
            dimension: "combined_job_hours".into(),
            scope: "Subscription".into(),
            provider_id: "Microsoft".into(),
            utilization: 9.5,
            holds: 1.0,
            limit: 10.0,
            period: "Monthly".into(),
        };
        assert_eq!(quota.remaining(), 0.0);
    }

    #[test]
    fn test_provider_status_from_wire() {
        let status: ProviderStatus = serde_json::from_value(json!({
            "id": "ionq",
            "currentAvailability": "Degraded",
            "targets": [
                {"id": "ionq.simulator", "currentAvailability": "Available", "averageQueueTime": 3},
                {"id": "ionq.qpu", "currentAvailability": "Unavailable"}
            ]
        }))
        .unwrap();

        assert_eq!(status.targets.len(), 2);
        assert_eq!(status.targets[0].average_queue_time, 3);
        assert_eq!(status.targets[1].average_queue_time, 0);
        assert!(status.targets[1].status_page.is_none());
    }
}
