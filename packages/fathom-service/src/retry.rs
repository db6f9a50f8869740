use std::{future::Future, time::Duration};

/// Retries `op` on transient failures with exponential backoff. The final
/// error is returned unchanged once attempts are exhausted or the failure is
/// deterministic.
pub async fn with_retry<T, E, F, Fut>(
	policy: &fathom_config::Retry,
	is_transient: impl Fn(&E) -> bool,
	mut op: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut attempt = 0_u32;

	loop {
		attempt += 1;

		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if attempt < policy.max_attempts && is_transient(&err) => {
				let delay = delay_for(policy, attempt);

				tokio::time::sleep(delay).await;
			},
			Err(err) => return Err(err),
		}
	}
}

fn delay_for(policy: &fathom_config::Retry, attempt: u32) -> Duration {
	let factor = policy.backoff_factor.powi(attempt.saturating_sub(1) as i32);
	let millis = (policy.base_delay_ms as f64 * factor).min(policy.max_delay_ms as f64);

	Duration::from_millis(millis as u64)
}
