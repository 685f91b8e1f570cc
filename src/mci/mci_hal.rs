//! Contract of the SDIF hardware library that programs the controller
use alloc::sync::Arc;

use super::{
    MCIConfig, MCIDmaDescRing, MCIEventType, MCIEvtHandler, MCIIrqContext, MCIResult,
    mci_cmddata::MCICmdData,
};

/// Callback the library runs between its internal polling attempts
pub type MCIRelaxHandler = Arc<dyn Fn() + Send + Sync>;

/// Register level controller driver
///
/// Every method takes `&self`: event handlers registered here are invoked
/// from the controller interrupt while a transfer is being waited on.
pub trait MCIHal: Send + Sync {
    /// Bring the controller up with `config`
    fn cfg_initialize(&self, config: &MCIConfig) -> MCIResult;

    /// Hand the IDMA descriptor ring to the controller
    fn set_idma_list(&self, ring: &MCIDmaDescRing) -> MCIResult;

    fn register_relax_handler(&self, relax: MCIRelaxHandler);

    /// Install `handler` for `evt`; it gets `args` back on every call
    fn register_evt_handler(
        &self,
        evt: MCIEventType,
        handler: MCIEvtHandler,
        args: Arc<MCIIrqContext>,
    );

    /// Start a command, returns once the registers are programmed
    fn dma_transfer(&self, cmd_data: &mut MCICmdData<'_>) -> MCIResult;

    /// Latch the response of the last finished command into `cmd_data`
    fn get_cmd_response(&self, cmd_data: &mut MCICmdData<'_>) -> MCIResult;

    fn set_clk_freq(&self, clk_hz: u32) -> MCIResult;

    fn set_bus_width(&self, base_addr: usize, width: u32);
}
