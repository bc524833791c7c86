pub trait ResultExt<T, E> {
	/// Logs the error at `error` level and discards it.
	fn ok_or_log(self) -> Option<T>
	where
		E: std::fmt::Display;

	/// Like [`ResultExt::ok_or_log`] for failures that are expected on some platforms.
	fn ok_or_warn(self) -> Option<T>
	where
		E: std::fmt::Display;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
	fn ok_or_log(self) -> Option<T>
	where
		E: std::fmt::Display,
	{
		self.inspect_err(|err| tracing::error!("{}", err)).ok()
	}

	fn ok_or_warn(self) -> Option<T>
	where
		E: std::fmt::Display,
	{
		self.inspect_err(|err| tracing::warn!("{}", err)).ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn converts_to_option() {
		let ok: Result<u8, String> = Ok(3);
		assert_eq!(ok.ok_or_log(), Some(3));
		let err: Result<u8, String> = Err("nope".into());
		assert_eq!(err.ok_or_warn(), None);
	}
}
