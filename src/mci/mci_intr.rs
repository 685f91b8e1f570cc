//! Interrupt side of a transfer: turn controller events into event flags
//!
//! The handlers below run in interrupt context. They only raise one flag in
//! the host event group and, for card detection, poke the hot-plug sink.
use alloc::sync::Arc;

use super::{MCIEvent, MCIEventType, MCIHal, MCIId};
use crate::{mci_host::MCIHostCardDetect, osa::OsaEvent};

/// Called by the hardware library as `(controller, args, status, dmac_status)`
pub type MCIEvtHandler = fn(MCIId, &MCIIrqContext, u32, u32);

/// What the interrupt handlers of one host can reach
pub struct MCIIrqContext {
    id: MCIId,
    event: OsaEvent<MCIEvent>,
    card_detect: Option<Arc<dyn MCIHostCardDetect>>,
}

impl MCIIrqContext {
    pub fn new(id: MCIId, card_detect: Option<Arc<dyn MCIHostCardDetect>>) -> Self {
        Self {
            id,
            event: OsaEvent::new(),
            card_detect,
        }
    }

    pub fn id(&self) -> MCIId {
        self.id
    }

    pub fn event(&self) -> &OsaEvent<MCIEvent> {
        &self.event
    }
}

impl core::fmt::Debug for MCIIrqContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MCIIrqContext")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("card_detect", &self.card_detect.is_some())
            .finish()
    }
}

pub fn card_detect_callback(id: MCIId, args: &MCIIrqContext, _status: u32, _dmac_status: u32) {
    args.event.send(MCIEvent::CARD_DETECTED);
    if let Some(card_detect) = &args.card_detect {
        card_detect.card_changed(id);
    }
}

pub fn command_done_callback(_id: MCIId, args: &MCIIrqContext, _status: u32, _dmac_status: u32) {
    args.event.send(MCIEvent::CMD_DONE);
}

pub fn data_done_callback(_id: MCIId, args: &MCIIrqContext, _status: u32, _dmac_status: u32) {
    args.event.send(MCIEvent::DATA_DONE);
}

pub fn sdio_irq_callback(_id: MCIId, args: &MCIIrqContext, _status: u32, _dmac_status: u32) {
    args.event.send(MCIEvent::SDIO_IRQ);
}

pub fn error_occur_callback(_id: MCIId, args: &MCIIrqContext, _status: u32, _dmac_status: u32) {
    args.event.send(MCIEvent::ERROR_OCCUR);
}

/// Handler installed for each event class
pub fn evt_handler(evt: MCIEventType) -> MCIEvtHandler {
    match evt {
        MCIEventType::CardDetected => card_detect_callback,
        MCIEventType::CmdDone => command_done_callback,
        MCIEventType::DataDone => data_done_callback,
        MCIEventType::SdioIrq => sdio_irq_callback,
        MCIEventType::ErrOccured => error_occur_callback,
    }
}

/// Register all five event handlers of a host
pub(crate) fn setup_interrupt(hal: &dyn MCIHal, args: &Arc<MCIIrqContext>) {
    for evt in MCIEventType::ALL {
        hal.register_evt_handler(evt, evt_handler(evt), args.clone());
    }
}
