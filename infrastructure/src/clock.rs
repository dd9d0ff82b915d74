//! [`BlockClock`] implementations.

use proposal_application::BlockClock;
use proposal_domain::Amount;

/// Clock pinned to one block, for replays and the `--block` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBlockClock {
    block: Amount,
}

impl FixedBlockClock {
    pub fn new(block: Amount) -> Self {
        Self { block }
    }
}

impl BlockClock for FixedBlockClock {
    fn current_block(&self) -> Amount {
        self.block
    }
}

/// Wall clock reporting UTC unix seconds, for tenants whose proposal
/// windows are timestamps rather than block heights.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BlockClock for SystemClock {
    fn current_block(&self) -> Amount {
        // Pre-epoch clocks report zero.
        let seconds = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        Amount::from(seconds)
    }
}
