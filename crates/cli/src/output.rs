//! Table rows for terminal output

use quasar_core::domain::TargetStatus;
use quasar_sdk::{JobDetails, Quota};
use tabled::Tabled;

#[derive(Tabled)]
pub struct JobRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Target")]
    pub target: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Created")]
    pub created: String,
}

impl From<&JobDetails> for JobRow {
    fn from(details: &JobDetails) -> Self {
        Self {
            id: details.id.to_string(),
            name: details.name.clone(),
            target: details.target.clone(),
            status: details.status.to_string(),
            created: details
                .creation_time
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Tabled)]
pub struct QuotaRow {
    #[tabled(rename = "Provider")]
    pub provider: String,
    #[tabled(rename = "Dimension")]
    pub dimension: String,
    #[tabled(rename = "Scope")]
    pub scope: String,
    #[tabled(rename = "Used")]
    pub used: String,
    #[tabled(rename = "Limit")]
    pub limit: String,
    #[tabled(rename = "Remaining")]
    pub remaining: String,
    #[tabled(rename = "Period")]
    pub period: String,
}

impl From<&Quota> for QuotaRow {
    fn from(quota: &Quota) -> Self {
        Self {
            provider: quota.provider_id.clone(),
            dimension: quota.dimension.clone(),
            scope: quota.scope.clone(),
            used: format!("{:.1}", quota.utilization + quota.holds),
            limit: format!("{:.1}", quota.limit),
            remaining: format!("{:.1}", quota.remaining()),
            period: quota.period.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct TargetRow {
    #[tabled(rename = "Target")]
    pub id: String,
    #[tabled(rename = "Availability")]
    pub availability: String,
    #[tabled(rename = "Avg queue (s)")]
    pub average_queue_time: i64,
}

impl From<&TargetStatus> for TargetRow {
    fn from(target: &TargetStatus) -> Self {
        Self {
            id: target.id.clone(),
            availability: target.current_availability.clone(),
            average_queue_time: target.average_queue_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_job_row_formats_creation_time() {
        let mut details = JobDetails::new("t", "p", "in", "out").with_name("demo");
        details.creation_time = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
        let row = JobRow::from(&details);
        assert_eq!(row.created, "2024-03-01 12:30:00");
        assert_eq!(row.status, "Waiting");
    }

    #[test]
    fn test_job_row_without_creation_time() {
        let row = JobRow::from(&JobDetails::new("t", "p", "in", "out"));
        assert_eq!(row.created, "-");
    }

    #[test]
    fn test_quota_row_counts_holds_as_used() {
        let quota = Quota {
            dimension: "combined_job_hours".into(),
            scope: "Subscription".into(),
            provider_id: "Microsoft".into(),
            utilization: 1.5,
            holds: 0.5,
            limit: 20.0,
            period: "Monthly".into(),
        };
        let row = QuotaRow::from(&quota);
        assert_eq!(row.used, "2.0");
        assert_eq!(row.limit, "20.0");
        assert_eq!(row.remaining, "18.0");
    }
}
