pub mod constants;
pub mod err;
pub mod mci_sdif;

mod mci_host_card_detect;
mod mci_host_config;
mod mci_host_device;
mod mci_host_dma_buf;
mod mci_host_request;
mod mci_host_transfer;

use alloc::{boxed::Box, sync::Arc};
use core::sync::atomic::{AtomicBool, Ordering};
use log::{error, info};

pub use constants::*;
pub use err::{MCIHostError, MCIHostStatus};
pub use mci_host_card_detect::MCIHostCardDetect;
pub use mci_host_config::{MCIHostConfig, MCIHostFlags, MCIHostIoCfg, MCIHostPlatform};
pub use mci_host_device::MCIHostDevice;
pub use mci_host_dma_buf::is_dma_ready;
pub use mci_host_transfer::{
    MCIHostCmd, MCIHostCompletion, MCIHostData, MCIHostDataDir, MCIHostRequest,
};

use crate::{
    mci::{
        MCIConfig, MCIDmaDescRing, MCIHal, MCIId, MCIIrqContext, SDIF_MAX_BLK_TRANS,
        mci_dma::SDIF_RELAX_DELAY, mci_intr,
    },
    osa::{DmaAllocator, Osa},
};

/// One SDIF controller together with everything a transfer on it needs
pub struct MCIHost {
    config: MCIConfig,
    host_config: MCIHostConfig,
    hal: Box<dyn MCIHal>,
    dev: Box<dyn MCIHostDevice>,
    desc_ring: MCIDmaDescRing,
    irq_ctx: Arc<MCIIrqContext>,
    osa: Arc<dyn Osa>,
    allocator: Arc<dyn DmaAllocator>,
    completion: Arc<dyn MCIHostCompletion>,
    busy: AtomicBool,
}

impl MCIHost {
    /// Bring up controller `id` through `hal`
    ///
    /// Allocates the descriptor ring, initializes the controller, installs
    /// the ring and the relax handler, then registers the event handlers.
    /// Whatever was set up is released again if a step fails.
    pub fn new(id: MCIId, hal: Box<dyn MCIHal>, platform: MCIHostPlatform) -> MCIHostStatus<Self> {
        let MCIHostPlatform {
            osa,
            allocator,
            completion,
            card_detect,
            transfer,
            non_removable,
        } = platform;

        let desc_ring = MCIDmaDescRing::new(&allocator, osa.as_ref(), SDIF_MAX_BLK_TRANS)
            .map_err(|err| {
                error!("Malloc rw_desc failed: {:?}", err);
                MCIHostError::OutOfMemory
            })?;

        let mut config = MCIConfig::lookup_config(id);
        config.non_removable_set(non_removable);

        if let Err(err) = hal.cfg_initialize(&config) {
            error!("SDIF controller init failed: {:?}", err);
            return Err(MCIHostError::HardwareInitFailed);
        }

        if let Err(err) = hal.set_idma_list(&desc_ring) {
            error!("SDIF controller setup DMA failed: {:?}", err);
            return Err(MCIHostError::HardwareInitFailed);
        }

        let relax_osa = osa.clone();
        hal.register_relax_handler(Arc::new(move || relax_osa.sleep(SDIF_RELAX_DELAY)));

        let irq_ctx = Arc::new(MCIIrqContext::new(id, card_detect));
        mci_intr::setup_interrupt(hal.as_ref(), &irq_ctx);

        info!(
            "SDIF{:?} ready, base {:#x} irq {} desc ring {:#x}",
            id,
            config.base_addr(),
            config.irq_num(),
            desc_ring.first_desc_dma()
        );

        Ok(MCIHost {
            config,
            host_config: MCIHostConfig::sdif_default(),
            hal,
            dev: transfer,
            desc_ring,
            irq_ctx,
            osa,
            allocator,
            completion,
            busy: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> MCIId {
        self.config.instance_id()
    }

    pub fn config(&self) -> &MCIConfig {
        &self.config
    }

    /// Limits the block framework has to respect
    pub fn host_config(&self) -> &MCIHostConfig {
        &self.host_config
    }

    pub fn desc_ring(&self) -> &MCIDmaDescRing {
        &self.desc_ring
    }

    pub fn hal(&self) -> &dyn MCIHal {
        self.hal.as_ref()
    }

    pub fn osa(&self) -> &dyn Osa {
        self.osa.as_ref()
    }

    pub fn irq_context(&self) -> &MCIIrqContext {
        &self.irq_ctx
    }

    pub(crate) fn allocator(&self) -> &Arc<dyn DmaAllocator> {
        &self.allocator
    }

    /// Let other threads run for a while
    pub fn relax(&self) {
        self.osa.sleep(SDIF_RELAX_DELAY);
    }

    fn busy_guard(&self) -> Option<MCIHostBusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| MCIHostBusyGuard(&self.busy))
    }
}

impl core::fmt::Debug for MCIHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MCIHost")
            .field("config", &self.config)
            .field("host_config", &self.host_config)
            .field("desc_ring", &self.desc_ring)
            .field("irq_ctx", &self.irq_ctx)
            .field("busy", &self.busy.load(Ordering::Relaxed))
            .finish()
    }
}

/// Marks the one transfer allowed in flight on a host
struct MCIHostBusyGuard<'a>(&'a AtomicBool);

impl Drop for MCIHostBusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
