//! Request to DMA transfer core of the SDIF host controller driver
//!
//! A block framework hands requests to [`MCIHost::send_request`]; the host
//! turns them into IDMA commands on the controller, sleeps until the
//! controller interrupt reports completion or an error, and calls the
//! framework back once per request.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod mci;
pub mod mci_host;
pub mod osa;

mod tools;

pub use mci::{MCIConfig, MCIDmaTransfer, MCIEvent, MCIEventType, MCIHal, MCIId, MCIWaitPolicy};
pub use mci_host::{
    MCIHost, MCIHostCmd, MCIHostCompletion, MCIHostData, MCIHostDataDir, MCIHostError,
    MCIHostIoCfg, MCIHostPlatform, MCIHostRequest, MCIHostResponseType, MCIHostStatus,
    mci_sdif::{sdif_host, sdif_host_init, sdif_host_remove},
};
pub use osa::{DmaAllocator, GlobalDmaAllocator, Osa};
