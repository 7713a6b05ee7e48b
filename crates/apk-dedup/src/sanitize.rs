const MAX_LEN: usize = 50;

/// Turns an untrusted version name into a token that is safe as a path component.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_` and the result is cut to 50
/// characters. Empty or blank names become `unknown`.
pub fn sanitize(version_name: &str) -> String {
	if version_name.trim().is_empty() {
		return "unknown".to_string();
	}

	version_name
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
				c
			} else {
				'_'
			}
		})
		.take(MAX_LEN)
		.collect()
}
