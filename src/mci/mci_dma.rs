//! IDMA transfers: descriptor ring ownership and the blocking transfer path
use alloc::sync::Arc;
use core::{ptr::NonNull, time::Duration};
use log::{debug, error, trace, warn};

use super::{
    MCIEvent,
    constants::{SDIF_MALLOC_CAP_DESC, SDIF_MAX_BLK_TRANS},
    mci_cmddata::MCICmdData,
};
use crate::{
    mci_host::{
        MCIHost, MCIHostCmd, MCIHostDevice, MCIHostError, MCIHostResponseType, MCIHostStatus,
    },
    osa::{DmaAllocator, Osa, OsaEventOpt, OsaStatus, PoolBuffer},
    tools::reverse_word_sequence_u32x4,
};

/// Window of one wait for completion or error flags
pub const SDIF_EVENT_WAIT_TIMEOUT: Duration = Duration::from_millis(5000);
/// Pause between two rounds of waiting
pub const SDIF_RELAX_DELAY: Duration = Duration::from_millis(1);

/// One IDMA descriptor, its layout belongs to the hardware library
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct MCIIDmaDesc {
    words: [u32; 8],
}

/// Descriptor ring shared with the controller for the lifetime of a host
#[derive(Debug)]
pub struct MCIDmaDescRing {
    buf: PoolBuffer,
    desc_num: u32,
    first_desc_dma: usize,
}

impl MCIDmaDescRing {
    pub fn new(allocator: &Arc<dyn DmaAllocator>, osa: &dyn Osa, desc_num: u32) -> OsaStatus<Self> {
        let size = desc_num as usize * size_of::<MCIIDmaDesc>();
        let buf = PoolBuffer::alloc(allocator, size, SDIF_MALLOC_CAP_DESC)?;
        let first_desc_dma = osa.virt_to_phys(buf.addr().as_ptr() as usize);

        Ok(Self {
            buf,
            desc_num,
            first_desc_dma,
        })
    }

    /// Ring sized for the largest transfer the host accepts
    pub fn sdif_default(allocator: &Arc<dyn DmaAllocator>, osa: &dyn Osa) -> OsaStatus<Self> {
        Self::new(allocator, osa, SDIF_MAX_BLK_TRANS)
    }

    pub fn first_desc(&self) -> NonNull<u8> {
        self.buf.addr()
    }

    pub fn first_desc_dma(&self) -> usize {
        self.first_desc_dma
    }

    pub fn desc_num(&self) -> u32 {
        self.desc_num
    }

    pub fn size(&self) -> usize {
        self.buf.size()
    }
}

/// How long one transfer may wait in total
///
/// Each wait for completion or error lasts [`SDIF_EVENT_WAIT_TIMEOUT`]; the
/// policy decides what happens when a round ends with neither.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MCIWaitPolicy {
    /// Wait until the transfer completes or the controller raises an error.
    /// A controller that hangs without raising an error blocks the caller
    /// forever, callers that need a bound use [`MCIWaitPolicy::Deadline`].
    #[default]
    UntilError,
    /// Fail with [`MCIHostError::Timeout`] once this much time has passed
    Deadline(Duration),
}

/// Transfer strategy that lets the IDMA move data and sleeps until the
/// controller interrupt reports the outcome
#[derive(Debug, Default, Clone, Copy)]
pub struct MCIDmaTransfer {
    policy: MCIWaitPolicy,
}

impl MCIDmaTransfer {
    pub fn new(policy: MCIWaitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MCIWaitPolicy {
        self.policy
    }

    /// Flags that must all be raised before the command counts as done
    pub fn wait_events(cmd_data: &MCICmdData<'_>) -> MCIEvent {
        if cmd_data.data().is_none() {
            MCIEvent::CMD_DONE
        } else {
            MCIEvent::CMD_DONE | MCIEvent::DATA_DONE
        }
    }

    fn wait_done(&self, host: &MCIHost, wait: MCIEvent) -> MCIHostStatus {
        let event = host.irq_context().event();
        let osa = host.osa();
        let start = osa.uptime();

        loop {
            if event
                .recv(
                    wait,
                    OsaEventOpt::AND | OsaEventOpt::CLEAR,
                    SDIF_EVENT_WAIT_TIMEOUT,
                    osa,
                )
                .is_ok()
            {
                return Ok(());
            }

            if event
                .recv(
                    MCIEvent::ERROR_OCCUR,
                    OsaEventOpt::OR | OsaEventOpt::CLEAR,
                    SDIF_EVENT_WAIT_TIMEOUT,
                    osa,
                )
                .is_ok()
            {
                error!("Sdif DMA transfer end up with error !!!");
                return Err(MCIHostError::HardwareIo);
            }

            let waited = osa.uptime().saturating_sub(start);
            if let MCIWaitPolicy::Deadline(limit) = self.policy {
                if waited >= limit {
                    error!("Sdif DMA transfer gave up after {:?}", waited);
                    return Err(MCIHostError::Timeout);
                }
            }

            warn!("Sdif DMA transfer still pending after {:?}", waited);
            host.relax();
        }
    }
}

impl MCIHostDevice for MCIDmaTransfer {
    fn transfer_function(
        &self,
        host: &MCIHost,
        cmd: &mut MCIHostCmd,
        cmd_data: &mut MCICmdData<'_>,
    ) -> MCIHostStatus {
        let wait = Self::wait_events(cmd_data);

        // leftovers of an earlier transfer must not complete this one
        let stale = host.irq_context().event().try_recv(
            MCIEvent::CMD_DONE | MCIEvent::DATA_DONE | MCIEvent::ERROR_OCCUR,
            OsaEventOpt::OR | OsaEventOpt::CLEAR,
        );
        if let Some(stale) = stale {
            debug!("drop stale events {:?}", stale);
        }

        trace!(
            "dma transfer cmd {} arg {:#x} flag {:?} wait {:?}",
            cmd_data.cmdidx(),
            cmd_data.cmdarg(),
            cmd_data.flag(),
            wait
        );

        if let Err(err) = host.hal().dma_transfer(cmd_data) {
            error!("FSdifDMATransfer() fail: {:?}", err);
            return Err(MCIHostError::SubmissionFailed);
        }

        self.wait_done(host, wait)?;

        if let Err(err) = host.hal().get_cmd_response(cmd_data) {
            warn!("get response of cmd {} failed: {:?}", cmd_data.cmdidx(), err);
        }
        response_copy(cmd, cmd_data.response());

        Ok(())
    }
}

/// Move the latched response into the command, long responses come back
/// with their words in reverse order
pub(crate) fn response_copy(cmd: &mut MCIHostCmd, raw: &[u32; 4]) {
    match cmd.response_type() {
        MCIHostResponseType::None => {}
        MCIHostResponseType::R2 => *cmd.response_mut() = reverse_word_sequence_u32x4(raw),
        _ => cmd.response_mut()[0] = raw[0],
    }
}
