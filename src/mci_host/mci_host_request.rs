//! Request entry points called by the block framework
use log::{debug, error, trace, warn};

use super::{
    MCIHost, MCIHostBusWidth, MCIHostCmd, MCIHostData, MCIHostDataDir, MCIHostError,
    MCIHostIoCfg, MCIHostRequest, MCIHostResponseType, MCIHostStatus,
    mci_host_dma_buf::MCIHostDmaBuf,
};
use crate::mci::{MCICmdData, MCICmdFlag, MCIData};

/// Flags that describe the response a command expects
pub(crate) fn response_flags(response_type: MCIHostResponseType) -> MCICmdFlag {
    let mut flag = MCICmdFlag::empty();

    if !matches!(
        response_type,
        MCIHostResponseType::R3 | MCIHostResponseType::R4 | MCIHostResponseType::None
    ) {
        flag |= MCICmdFlag::NEED_RESP_CRC;
    }

    if response_type != MCIHostResponseType::None {
        flag |= MCICmdFlag::EXP_RESP;
        if response_type == MCIHostResponseType::R2 {
            flag |= MCICmdFlag::EXP_LONG_RESP;
        }
    }

    flag
}

/// Controller flags for the main command of a request
pub(crate) fn cmd_flags(cmd: &MCIHostCmd, data: Option<&MCIHostData<'_>>) -> MCICmdFlag {
    let mut flag = response_flags(cmd.response_type());

    if cmd.is_go_idle() {
        flag |= MCICmdFlag::NEED_INIT;
    }

    if cmd.is_go_inactive() {
        flag |= MCICmdFlag::NEED_AUTO_STOP;
    }

    if let Some(data) = data {
        flag |= MCICmdFlag::EXP_DATA;
        flag |= match data.dir() {
            MCIHostDataDir::Read => MCICmdFlag::READ_DATA,
            MCIHostDataDir::Write => MCICmdFlag::WRITE_DATA,
        };
    }

    flag
}

impl MCIHost {
    /// Run `req` and report it to the completion sink
    ///
    /// Outcomes are recorded in the error slots of the command and of the
    /// stop command. The completion sink is called exactly once, after any
    /// scratch buffer of the request has been released.
    pub fn send_request(&self, req: &mut MCIHostRequest<'_>) {
        if req.cmd.is_reserved() {
            debug!("skip SDIO only cmd {}", req.cmd.index());
            req.cmd.err_set(Err(MCIHostError::CmdNotSupport));
        } else {
            match self.busy_guard() {
                Some(_busy) => self.request_transfer(req),
                None => {
                    error!("cmd {} issued while another transfer is in flight", req.cmd.index());
                    req.cmd.err_set(Err(MCIHostError::Busy));
                }
            }
        }

        self.completion.request_complete(self.id(), req);
    }

    fn request_transfer(&self, req: &mut MCIHostRequest<'_>) {
        let MCIHostRequest { cmd, data, stop } = req;

        let flag = cmd_flags(cmd, data.as_ref());
        let geometry = data
            .as_ref()
            .map(|data| (data.block_size(), data.block_count(), data.dir()));

        let mut dma_buf = match (data.as_mut(), geometry) {
            (Some(data), Some((blksz, blkcnt, dir))) => {
                let datalen = blksz as usize * blkcnt as usize;
                match MCIHostDmaBuf::prepare(self.allocator(), data.buf_mut(), datalen, dir) {
                    Ok(dma_buf) => Some(dma_buf),
                    Err(err) => {
                        error!("cmd {} abandoned: {:?}", cmd.index(), err);
                        cmd.err_set(Err(err));
                        return;
                    }
                }
            }
            _ => None,
        };

        let ret = {
            let mut cmd_data = MCICmdData::new(cmd.index(), cmd.argument(), flag);
            if let (Some(dma_buf), Some((blksz, blkcnt, _))) = (dma_buf.as_mut(), geometry) {
                let buf = dma_buf.dma_slice();
                let buf_dma = self.osa().virt_to_phys(buf.as_ptr() as usize);
                cmd_data.data_set(Some(MCIData::new(blksz, blkcnt, buf, buf_dma)));
            }
            self.dev.transfer_function(self, cmd, &mut cmd_data)
        };
        if let Err(err) = ret {
            error!("transfer of cmd {} failed: {:?}", cmd.index(), err);
        }
        cmd.err_set(ret);

        if ret.is_ok() {
            if let Some(dma_buf) = dma_buf.as_mut() {
                dma_buf.finish_read();
            }
        }

        if let Some(stop) = stop.as_mut() {
            let ret = self.stop_transfer(stop);
            if let Err(err) = ret {
                warn!("stop cmd {} failed: {:?}", stop.index(), err);
            }
            stop.err_set(ret);
        }

        if let Some(dma_buf) = dma_buf {
            trace!("release dma buffer, scratch {}", dma_buf.uses_scratch());
        }
    }

    fn stop_transfer(&self, stop: &mut MCIHostCmd) -> MCIHostStatus {
        let flag = response_flags(stop.response_type());
        let mut cmd_data = MCICmdData::new(stop.index(), stop.argument(), flag);
        self.dev.transfer_function(self, stop, &mut cmd_data)
    }

    /// Apply clock and bus width requested by the block framework
    pub fn set_io_cfg(&self, io_cfg: &MCIHostIoCfg) -> MCIHostStatus {
        let mut ret = Ok(());

        if io_cfg.clock != 0 {
            if let Err(err) = self.hal().set_clk_freq(io_cfg.clock) {
                error!("FSdifSetClkFreq {} Hz fail: {:?}", io_cfg.clock, err);
                ret = Err(MCIHostError::ClockSetFailed);
            }
        }

        match MCIHostBusWidth::try_from(io_cfg.bus_width) {
            Ok(width) => self
                .hal()
                .set_bus_width(self.config().base_addr(), width.bits()),
            Err(code) => {
                error!("Invalid bus width {}", code);
                ret = ret.and(Err(MCIHostError::InvalidArgument));
            }
        }

        ret
    }
}
