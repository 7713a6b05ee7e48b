use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the backup layer remembers about one stored backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
	pub package_name: String,
	pub backup_id: String,
	pub created_at: DateTime<Utc>,
	#[serde(default)]
	pub version_name: Option<String>,
	pub version_code: i64,
	/// Dedup directory holding this backup's APKs, `None` when they were stored inline
	#[serde(default)]
	pub apk_location: Option<String>,
}

/// Number of records whose APKs live in the dedup directory `identifier`
pub fn count_references(records: &[BackupRecord], identifier: &str) -> usize {
	records
		.iter()
		.filter(|record| record.apk_location.as_deref() == Some(identifier))
		.count()
}
