use super::{
    MCIHostError, MCIHostStatus,
    constants::{MCIHostCommonCmd, MCIHostResponseType, MCIHostSDIOCmd},
};
use crate::mci::MCIId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MCIHostCmd {
    index: u32,
    argument: u32,
    response_type: MCIHostResponseType,
    response: [u32; 4],
    err: MCIHostStatus,
}

impl Default for MCIHostCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl MCIHostCmd {
    pub fn new() -> Self {
        MCIHostCmd {
            index: 0,
            argument: 0,
            response_type: MCIHostResponseType::None,
            response: [0; 4],
            err: Ok(()),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn index_set(&mut self, index: u32) {
        self.index = index;
    }

    pub fn argument(&self) -> u32 {
        self.argument
    }

    pub fn argument_set(&mut self, argument: u32) {
        self.argument = argument;
    }

    pub fn response_type(&self) -> MCIHostResponseType {
        self.response_type
    }

    pub fn response_type_set(&mut self, response_type: MCIHostResponseType) {
        self.response_type = response_type;
    }

    /// Response words, long responses use all four, short ones word 0
    pub fn response(&self) -> &[u32; 4] {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut [u32; 4] {
        &mut self.response
    }

    /// Outcome recorded by the host for this command
    pub fn err(&self) -> MCIHostStatus {
        self.err
    }

    pub fn err_set(&mut self, err: MCIHostStatus) {
        self.err = err;
    }

    /// Codes the controller keeps for SDIO, they never reach the hardware
    pub fn is_reserved(&self) -> bool {
        self.index == MCIHostSDIOCmd::SendOperationCondition as u32
            || self.index == MCIHostSDIOCmd::RWIODirect as u32
    }

    pub(crate) fn is_go_idle(&self) -> bool {
        self.index == MCIHostCommonCmd::GoIdleState as u32
    }

    pub(crate) fn is_go_inactive(&self) -> bool {
        self.index == MCIHostCommonCmd::GoInactiveState as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCIHostDataDir {
    Read,
    Write,
}

/// Data phase of a request, `buf` belongs to the caller
#[derive(Debug)]
pub struct MCIHostData<'a> {
    block_size: u32,
    block_count: u32,
    dir: MCIHostDataDir,
    buf: &'a mut [u8],
}

impl<'a> MCIHostData<'a> {
    pub fn new(block_size: u32, block_count: u32, dir: MCIHostDataDir, buf: &'a mut [u8]) -> Self {
        MCIHostData {
            block_size,
            block_count,
            dir,
            buf,
        }
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    pub fn dir(&self) -> MCIHostDataDir {
        self.dir
    }

    /// Bytes moved by the transfer
    pub fn len(&self) -> usize {
        self.block_size as usize * self.block_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn buf(&self) -> &[u8] {
        &self.buf[..]
    }

    pub fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..]
    }
}

/// A command with optional data and optional stop command
#[derive(Debug)]
pub struct MCIHostRequest<'a> {
    pub(crate) cmd: MCIHostCmd,
    pub(crate) data: Option<MCIHostData<'a>>,
    pub(crate) stop: Option<MCIHostCmd>,
}

impl<'a> MCIHostRequest<'a> {
    pub fn new(cmd: MCIHostCmd) -> Self {
        MCIHostRequest {
            cmd,
            data: None,
            stop: None,
        }
    }

    pub fn with_data(mut self, data: MCIHostData<'a>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_stop(mut self, stop: MCIHostCmd) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn cmd(&self) -> &MCIHostCmd {
        &self.cmd
    }

    pub fn cmd_mut(&mut self) -> &mut MCIHostCmd {
        &mut self.cmd
    }

    pub fn data(&self) -> Option<&MCIHostData<'a>> {
        self.data.as_ref()
    }

    pub fn stop(&self) -> Option<&MCIHostCmd> {
        self.stop.as_ref()
    }

    /// First failure among the command and the stop command
    pub fn result(&self) -> Result<(), MCIHostError> {
        self.cmd.err()?;
        match &self.stop {
            Some(stop) => stop.err(),
            None => Ok(()),
        }
    }
}

/// Block framework side that learns about finished requests
pub trait MCIHostCompletion: Send + Sync {
    /// Called exactly once per request handed to the host
    fn request_complete(&self, id: MCIId, req: &MCIHostRequest<'_>);
}
