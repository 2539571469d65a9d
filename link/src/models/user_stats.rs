use serde::{Deserialize, Serialize};

/// Registration counters shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(rename = "totalUsers", default)]
    pub total_users: u64,

    #[serde(rename = "yesterdayUsers", default)]
    pub yesterday_users: u64,

    #[serde(rename = "last7DaysUsers", default)]
    pub last_7_days_users: u64,

    #[serde(rename = "last30DaysUsers", default)]
    pub last_30_days_users: u64,
}
