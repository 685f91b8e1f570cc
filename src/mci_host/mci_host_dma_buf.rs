//! DMA ready view of a caller buffer
//!
//! The IDMA needs buffers that start on a 512 byte boundary and span whole
//! 512 byte blocks. Caller buffers that do not qualify are bounced through a
//! scratch region owned by the request; the region goes back to the
//! allocator when the view is dropped, whatever the outcome of the transfer.
use alloc::sync::Arc;
use log::{error, trace};

use super::{MCIHostDataDir, MCIHostError, MCIHostStatus};
use crate::{
    mci::{SDIF_DMA_ALIGN, SDIF_DMA_BLK_SZ},
    osa::{DmaAllocator, PoolBuffer},
};

/// Whether the IDMA can work on `buf` directly for a `datalen` bytes transfer
pub fn is_dma_ready(buf: &[u8], datalen: usize) -> bool {
    (buf.as_ptr() as usize) % SDIF_DMA_ALIGN == 0
        && datalen % SDIF_DMA_BLK_SZ == 0
        && buf.len() >= datalen
}

#[derive(Debug)]
pub(crate) struct MCIHostDmaBuf<'a> {
    caller: &'a mut [u8],
    scratch: Option<PoolBuffer>,
    datalen: usize,
    dir: MCIHostDataDir,
}

impl<'a> MCIHostDmaBuf<'a> {
    pub fn prepare(
        allocator: &Arc<dyn DmaAllocator>,
        caller: &'a mut [u8],
        datalen: usize,
        dir: MCIHostDataDir,
    ) -> MCIHostStatus<Self> {
        if datalen == 0 {
            return Err(MCIHostError::InvalidArgument);
        }

        if is_dma_ready(caller, datalen) {
            return Ok(Self {
                caller,
                scratch: None,
                datalen,
                dir,
            });
        }

        let size = datalen.div_ceil(SDIF_DMA_BLK_SZ) * SDIF_DMA_BLK_SZ;
        let mut scratch = PoolBuffer::alloc(allocator, size, SDIF_DMA_ALIGN).map_err(|err| {
            error!("Malloc data_buf_aligned failed: {:?}", err);
            MCIHostError::OutOfMemory
        })?;
        trace!(
            "bounce {} bytes at {:p} through {:?}",
            datalen,
            caller.as_ptr(),
            scratch
        );

        if dir == MCIHostDataDir::Write {
            let len = caller.len().min(datalen);
            scratch
                .copy_from_slice(&caller[..len])
                .map_err(|_| MCIHostError::InvalidArgument)?;
        }

        Ok(Self {
            caller,
            scratch: Some(scratch),
            datalen,
            dir,
        })
    }

    pub fn uses_scratch(&self) -> bool {
        self.scratch.is_some()
    }

    /// Region the controller reads from or writes to
    pub fn dma_slice(&mut self) -> &mut [u8] {
        let datalen = self.datalen;
        match &mut self.scratch {
            Some(scratch) => &mut scratch.as_slice_mut()[..datalen],
            None => &mut self.caller[..datalen],
        }
    }

    /// Hand data read into the scratch region back to the caller
    pub fn finish_read(&mut self) {
        if self.dir != MCIHostDataDir::Read {
            return;
        }
        if let Some(scratch) = &self.scratch {
            let len = self.caller.len().min(self.datalen);
            self.caller[..len].copy_from_slice(&scratch.as_slice()[..len]);
        }
    }
}
