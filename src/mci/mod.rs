//! SDIF controller side: configuration, command descriptors, the hardware
//! library contract, interrupt events and DMA transfers
pub mod constants;
pub mod err;
pub mod mci_cmddata;
pub mod mci_config;
pub mod mci_dma;
pub mod mci_hal;
pub mod mci_intr;

pub use constants::*;
pub use err::{MCIError, MCIResult};
pub use mci_cmddata::{MCICmdData, MCICmdFlag, MCIData};
pub use mci_config::MCIConfig;
pub use mci_dma::{MCIDmaDescRing, MCIDmaTransfer, MCIIDmaDesc, MCIWaitPolicy};
pub use mci_hal::{MCIHal, MCIRelaxHandler};
pub use mci_intr::{MCIEvtHandler, MCIIrqContext};
