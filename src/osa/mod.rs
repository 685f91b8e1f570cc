//! OS services the driver needs: time, sleeping, event flags and DMA memory
pub mod err;
pub mod event;
pub mod pool_buffer;

use core::time::Duration;

pub use err::{OsaError, OsaStatus};
pub use event::{OsaEvent, OsaEventOpt};
pub use pool_buffer::{DmaAllocator, GlobalDmaAllocator, PoolBuffer};

/// Time base and scheduling hooks of the hosting OS
pub trait Osa: Send + Sync {
    /// Monotonic time since an arbitrary origin
    fn uptime(&self) -> Duration;

    /// Give up the processor for at least `duration`
    fn sleep(&self, duration: Duration);

    /// Address the controller uses to reach `vaddr`
    fn virt_to_phys(&self, vaddr: usize) -> usize {
        vaddr
    }
}

/// Busy-waiting [`Osa`] on the ARM generic timer
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericTimerOsa {
    pv_offset: usize,
}

#[cfg(target_arch = "aarch64")]
impl GenericTimerOsa {
    /// `pv_offset` is added to a virtual address to get the bus address
    pub const fn new(pv_offset: usize) -> Self {
        Self { pv_offset }
    }
}

#[cfg(target_arch = "aarch64")]
impl Osa for GenericTimerOsa {
    fn uptime(&self) -> Duration {
        use aarch64_cpu::registers::{CNTFRQ_EL0, CNTPCT_EL0, Readable};

        let freq = CNTFRQ_EL0.get().max(1) as u128;
        let ticks = CNTPCT_EL0.get() as u128;
        Duration::from_nanos((ticks * 1_000_000_000 / freq) as u64)
    }

    fn sleep(&self, duration: Duration) {
        let deadline = self.uptime() + duration;
        while self.uptime() < deadline {
            core::hint::spin_loop();
        }
    }

    fn virt_to_phys(&self, vaddr: usize) -> usize {
        vaddr.wrapping_add(self.pv_offset)
    }
}
