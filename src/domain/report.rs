/// Outcome of one multicast request.
///
/// Unknown tokens are routine output, not an error: the provider accepted
/// the request and rejected individual registrations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MulticastReport {
    /// Number of tokens the request was addressed to.
    pub attempted: usize,
    /// Tokens the provider reports as no longer registered.
    pub unknown_tokens: Vec<String>,
}

impl MulticastReport {
    #[must_use]
    pub const fn new(attempted: usize, unknown_tokens: Vec<String>) -> Self {
        Self { attempted, unknown_tokens }
    }

    /// Tokens not reported unknown are implicitly successful for the batch.
    #[must_use]
    pub fn successes(&self) -> usize {
        self.attempted.saturating_sub(self.unknown_tokens.len())
    }
}
