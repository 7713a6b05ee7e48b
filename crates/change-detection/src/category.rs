use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Kind of per-package data directory that gets scanned for changes
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	PartialOrd,
	Ord,
	Serialize,
	Deserialize,
	Display,
	EnumIter,
	EnumString,
	AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataCategory {
	/// Credential-encrypted app data, `/data/data/<package>`
	AppData,
	/// Device-encrypted app data, `/data/user_de/<user>/<package>`
	DeviceProtectedData,
	/// `Android/data/<package>` on shared storage
	ExternalData,
	/// `Android/obb/<package>`
	Obb,
	/// `Android/media/<package>`
	Media,
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use strum::IntoEnumIterator;

	use super::*;

	#[test]
	fn names_round_trip_through_strum_and_serde() {
		for category in DataCategory::iter() {
			let name = category.to_string();
			assert_eq!(DataCategory::from_str(&name).unwrap(), category);
			assert_eq!(
				serde_json::to_string(&category).unwrap(),
				format!("\"{name}\"")
			);
		}

		assert_eq!(DataCategory::DeviceProtectedData.as_ref(), "device_protected_data");
	}
}
