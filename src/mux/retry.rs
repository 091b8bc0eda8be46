use super::config::RetryScope;

/// Consecutive-timeout bookkeeping for one scheduler
///
/// With [`RetryScope::Global`] a single counter is shared by all sources and
/// any record resets it. With [`RetryScope::PerSource`] each slot counts on
/// its own and only its own records reset it.
#[derive(Debug)]
pub struct RetryBudget {
    scope: RetryScope,
    max_retries: usize,
    global: usize,
    per_source: Vec<usize>,
}

impl RetryBudget {
    pub fn new(scope: RetryScope, max_retries: usize, sources: usize) -> Self {
        let per_source = match scope {
            RetryScope::Global => Vec::new(),
            RetryScope::PerSource => vec![0; sources],
        };
        Self {
            scope,
            max_retries,
            global: 0,
            per_source,
        }
    }

    pub fn scope(&self) -> RetryScope {
        self.scope
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Count a timeout against `slot`; true once the budget is spent
    pub fn record_timeout(&mut self, slot: usize) -> bool {
        let count = match self.scope {
            RetryScope::Global => {
                self.global += 1;
                self.global
            }
            RetryScope::PerSource => {
                let counter = &mut self.per_source[slot];
                *counter += 1;
                *counter
            }
        };
        count >= self.max_retries
    }

    /// A record arrived from `slot`
    pub fn record_success(&mut self, slot: usize) {
        match self.scope {
            RetryScope::Global => self.global = 0,
            RetryScope::PerSource => self.per_source[slot] = 0,
        }
    }

    /// `slot` left the rotation
    pub fn forget(&mut self, slot: usize) {
        if let Some(counter) = self.per_source.get_mut(slot) {
            *counter = 0;
        }
    }

    /// Current consecutive-timeout count; the highest one for per-source
    pub fn consecutive(&self) -> usize {
        match self.scope {
            RetryScope::Global => self.global,
            RetryScope::PerSource => self.per_source.iter().copied().max().unwrap_or(0),
        }
    }
}
