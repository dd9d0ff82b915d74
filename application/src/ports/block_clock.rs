//! Port for reading the chain position proposals are evaluated at.

use proposal_domain::Amount;

/// Source of the current block number.
///
/// Status is a pure function of the timeline and this value, so the clock
/// is the only moving input of an evaluation.
pub trait BlockClock: Send + Sync {
    fn current_block(&self) -> Amount;
}

impl<C: BlockClock + ?Sized> BlockClock for std::sync::Arc<C> {
    fn current_block(&self) -> Amount {
        (**self).current_block()
    }
}
