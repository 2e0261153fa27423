//! Built-in sample data set

use serde_json::{Value, json};

/// Four resources covering busy, idle, oversized and telemetry-free cases
pub fn sample_resources() -> Value {
    json!([
        {
            "id": "prod-web-server-01",
            "type": "VM",
            "region": "us-east-1",
            "size": "m5.2xlarge",
            "cpuUsagePercent": 15,
            "memoryUsagePercent": 25,
            "idleHoursPerDay": 0
        },
        {
            "id": "staging-db-instance",
            "type": "DATABASE",
            "region": "us-west-2",
            "size": "db.r5.large",
            "cpuUsagePercent": 5,
            "memoryUsagePercent": 10,
            "idleHoursPerDay": 16
        },
        {
            "id": "dev-vm-for-testing",
            "type": "VM",
            "region": "eu-central-1",
            "size": "t3.medium",
            "cpuUsagePercent": 2,
            "memoryUsagePercent": 5,
            "idleHoursPerDay": 22
        },
        {
            "id": "backup-storage-main",
            "type": "STORAGE_BUCKET",
            "region": "us-east-1"
        }
    ])
}

/// Sample data pretty-printed with two-space indentation
pub fn sample_text() -> String {
    format!("{:#}", sample_resources())
}
