use crate::mci::MCIId;

/// Hot-plug sink of the block framework
pub trait MCIHostCardDetect: Send + Sync {
    /// Runs in interrupt context, must not block
    fn card_changed(&self, id: MCIId);
}
