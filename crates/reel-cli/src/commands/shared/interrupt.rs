use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels a token on Ctrl-C for as long as the guard lives.
pub struct InterruptGuard {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl InterruptGuard {
    #[must_use]
    pub fn install() -> Self {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let listener = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("interrupt received, cancelling");
                    trigger.cancel();
                }
                Err(error) => tracing::warn!(%error, "failed to listen for Ctrl-C"),
            }
        });
        Self { token, listener }
    }

    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
