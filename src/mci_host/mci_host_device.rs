use super::{MCIHost, MCIHostCmd, MCIHostStatus};
use crate::mci::MCICmdData;

/// A way of running one command on the controller
///
/// The host calls `transfer_function` for the main command and again for the
/// stop command of a request; implementations only differ in how they move
/// data and wait for the outcome.
pub trait MCIHostDevice: Send + Sync {
    /// Run `cmd_data` and write the response into `cmd` on success
    fn transfer_function(
        &self,
        host: &MCIHost,
        cmd: &mut MCIHostCmd,
        cmd_data: &mut MCICmdData<'_>,
    ) -> MCIHostStatus;
}
