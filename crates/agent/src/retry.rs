use std::time::Duration;

/// Bounded attempts with exponential backoff, replacing the legacy
/// run-level mutable retry counter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: u32,
}

impl RetryPolicy {
    /// Backoff slept after failed attempt `attempt` (0-indexed):
    /// `backoff_base ^ attempt` seconds.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs(u64::from(self.backoff_base).saturating_pow(attempt))
    }
}

/// Runs `op` until it succeeds or the attempt budget is exhausted,
/// sleeping the policy's backoff after each failure.
pub async fn run_with_retries<T, F, Fut>(policy: RetryPolicy, mut op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let mut last_error = anyhow::anyhow!("retry policy permits no attempts");

    for attempt in 0..policy.max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    attempt,
                    ?backoff,
                    error = format!("{error:#}"),
                    "run attempt failed"
                );
                tokio::time::sleep(backoff).await;
                last_error = error;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn success_short_circuits_retries() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff_base: 3,
        };
        let started = tokio::time::Instant::now();

        let result = run_with_retries(policy, || {
            calls.set(calls.get() + 1);
            async { Ok(42) }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_follow_the_exponential_schedule() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff_base: 3,
        };
        let started = tokio::time::Instant::now();

        let result: anyhow::Result<()> = run_with_retries(policy, || {
            calls.set(calls.get() + 1);
            async { anyhow::bail!("provider throttled") }
        })
        .await;

        assert!(result.is_err());
        // Exactly five attempts, no sixth.
        assert_eq!(calls.get(), 5);
        // 3^0 + 3^1 + 3^2 + 3^3 + 3^4 seconds of backoff.
        assert_eq!(started.elapsed(), Duration::from_secs(121));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff_base: 3,
        };
        let started = tokio::time::Instant::now();

        let result = run_with_retries(policy, || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt <= 2 {
                    anyhow::bail!("transient failure")
                }
                Ok("recovered")
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "recovered");
        assert_eq!(calls.get(), 3);
        // Slept 3^0 and 3^1 before the successful third attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }
}
