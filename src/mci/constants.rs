use bitflags::bitflags;

/// Data buffers handed to the IDMA must start on this boundary
pub const SDIF_DMA_ALIGN: usize = 512;
/// Data buffers handed to the IDMA must be a multiple of this size
pub const SDIF_DMA_BLK_SZ: usize = 512;
/// Number of IDMA descriptors, also the most blocks one transfer can carry
pub const SDIF_MAX_BLK_TRANS: u32 = 20;
/// Alignment of the IDMA descriptor ring
pub const SDIF_MALLOC_CAP_DESC: usize = 256;
/// Supported voltage range is 1.65v-3.6v (VDD_165_195-VDD_35_36)
pub const SDIF_VALID_OCR: u32 = 0x00FF_FF80;

pub const SDIF_MIN_CLK_HZ: u32 = 400_000;
pub const SDIF_MAX_CLK_HZ: u32 = 50_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MCIId {
    MCI0,
    MCI1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCITransMode {
    DMA,
    PIO,
}

/// Event classes the hardware library reports from its interrupt handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MCIEventType {
    CardDetected,
    CmdDone,
    DataDone,
    SdioIrq,
    ErrOccured,
}

impl MCIEventType {
    pub const ALL: [MCIEventType; 5] = [
        MCIEventType::CardDetected,
        MCIEventType::CmdDone,
        MCIEventType::DataDone,
        MCIEventType::SdioIrq,
        MCIEventType::ErrOccured,
    ];

    /// Flag raised in the host event group for this event class
    pub fn flag(self) -> MCIEvent {
        match self {
            MCIEventType::CardDetected => MCIEvent::CARD_DETECTED,
            MCIEventType::CmdDone => MCIEvent::CMD_DONE,
            MCIEventType::DataDone => MCIEvent::DATA_DONE,
            MCIEventType::ErrOccured => MCIEvent::ERROR_OCCUR,
            MCIEventType::SdioIrq => MCIEvent::SDIO_IRQ,
        }
    }
}

bitflags! {
    /// Bits of the per-host event group
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MCIEvent: u32 {
        const CARD_DETECTED = 1 << 0;
        const CMD_DONE = 1 << 1;
        const DATA_DONE = 1 << 2;
        const ERROR_OCCUR = 1 << 3;
        const SDIO_IRQ = 1 << 4;
    }
}
