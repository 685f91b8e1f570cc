use alloc::{boxed::Box, sync::Arc};
use bitflags::bitflags;

use super::{MCIHostBusWidth, MCIHostCardDetect, MCIHostCompletion, MCIHostDevice};
use crate::{
    mci::{
        MCIDmaTransfer, MCIWaitPolicy, SDIF_DMA_BLK_SZ, SDIF_MAX_BLK_TRANS, SDIF_MAX_CLK_HZ,
        SDIF_MIN_CLK_HZ, SDIF_VALID_OCR,
    },
    osa::{DmaAllocator, Osa},
};

bitflags! {
    /// Features the block framework may rely on
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MCIHostFlags: u32 {
        const MULTI_BLOCK_WRITE = 1 << 0;
        const BUS_WIDTH_4 = 1 << 1;
        const BUS_WIDTH_8 = 1 << 2;
    }
}

/// Limits of one host, published to the block framework at init
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MCIHostConfig {
    pub freq_min: u32,
    pub freq_max: u32,
    pub valid_ocr: u32,
    pub flags: MCIHostFlags,
    pub max_seg_size: u32,
    pub max_dma_segs: u32,
    pub max_blk_size: u32,
    pub max_blk_count: u32,
}

impl MCIHostConfig {
    pub fn sdif_default() -> Self {
        MCIHostConfig {
            freq_min: SDIF_MIN_CLK_HZ,
            freq_max: SDIF_MAX_CLK_HZ,
            valid_ocr: SDIF_VALID_OCR,
            flags: MCIHostFlags::MULTI_BLOCK_WRITE | MCIHostFlags::BUS_WIDTH_4,
            max_seg_size: SDIF_DMA_BLK_SZ as u32,
            max_dma_segs: SDIF_MAX_BLK_TRANS,
            max_blk_size: SDIF_DMA_BLK_SZ as u32,
            max_blk_count: SDIF_MAX_BLK_TRANS,
        }
    }
}

impl Default for MCIHostConfig {
    fn default() -> Self {
        Self::sdif_default()
    }
}

/// Bus settings requested by the block framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MCIHostIoCfg {
    /// Card clock in Hz, 0 keeps the current clock
    pub clock: u32,
    /// Raw bus width code, see [`MCIHostBusWidth`]
    pub bus_width: u32,
}

impl MCIHostIoCfg {
    pub fn new(clock: u32, bus_width: MCIHostBusWidth) -> Self {
        let bus_width = match bus_width {
            MCIHostBusWidth::Bit1 => 0,
            MCIHostBusWidth::Bit4 => 2,
            MCIHostBusWidth::Bit8 => 3,
        };
        Self { clock, bus_width }
    }
}

/// Services and collaborators a host is built with
pub struct MCIHostPlatform {
    pub osa: Arc<dyn Osa>,
    pub allocator: Arc<dyn DmaAllocator>,
    pub completion: Arc<dyn MCIHostCompletion>,
    pub card_detect: Option<Arc<dyn MCIHostCardDetect>>,
    pub transfer: Box<dyn MCIHostDevice>,
    pub non_removable: bool,
}

impl MCIHostPlatform {
    /// DMA transfers that wait until the controller reports an error
    pub fn new(
        osa: Arc<dyn Osa>,
        allocator: Arc<dyn DmaAllocator>,
        completion: Arc<dyn MCIHostCompletion>,
    ) -> Self {
        Self {
            osa,
            allocator,
            completion,
            card_detect: None,
            transfer: Box::new(MCIDmaTransfer::new(MCIWaitPolicy::UntilError)),
            non_removable: false,
        }
    }

    pub fn with_card_detect(mut self, card_detect: Arc<dyn MCIHostCardDetect>) -> Self {
        self.card_detect = Some(card_detect);
        self
    }

    pub fn with_transfer(mut self, transfer: Box<dyn MCIHostDevice>) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn with_wait_policy(self, policy: MCIWaitPolicy) -> Self {
        self.with_transfer(Box::new(MCIDmaTransfer::new(policy)))
    }

    /// eMMC soldered on board instead of a removable TF card
    pub fn with_non_removable(mut self, non_removable: bool) -> Self {
        self.non_removable = non_removable;
        self
    }
}
