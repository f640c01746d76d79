use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceSummary {
    pub email: bool,
    pub whatsapp: bool,
    pub telegram: bool,
    pub sms: bool,
    pub karma_tracker: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceSummary,
}

impl HealthCheckResponse {
    pub fn ok(services: ServiceSummary) -> Self {
        Self {
            status: "OK".to_string(),
            message: "Communication gateway is running".to_string(),
            timestamp: Utc::now(),
            services,
        }
    }
}
