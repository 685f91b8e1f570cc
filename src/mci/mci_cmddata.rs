use bitflags::bitflags;

bitflags! {
    /// How the controller has to issue a command
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MCICmdFlag: u32 {
        const NEED_INIT = 1 << 1;
        const EXP_RESP = 1 << 2;
        const EXP_LONG_RESP = 1 << 3;
        const NEED_RESP_CRC = 1 << 4;
        const EXP_DATA = 1 << 5;
        const WRITE_DATA = 1 << 6;
        const READ_DATA = 1 << 7;
        const NEED_AUTO_STOP = 1 << 8;
    }
}

/// Data phase of a command, `buf` is already DMA ready
#[derive(Debug)]
pub struct MCIData<'a> {
    blksz: u32,
    blkcnt: u32,
    datalen: u32,
    buf: &'a mut [u8],
    buf_dma: usize,
}

impl<'a> MCIData<'a> {
    pub fn new(blksz: u32, blkcnt: u32, buf: &'a mut [u8], buf_dma: usize) -> Self {
        MCIData {
            blksz,
            blkcnt,
            datalen: blksz * blkcnt,
            buf,
            buf_dma,
        }
    }

    pub fn blksz(&self) -> u32 {
        self.blksz
    }

    pub fn blkcnt(&self) -> u32 {
        self.blkcnt
    }

    pub fn datalen(&self) -> u32 {
        self.datalen
    }

    pub fn buf(&self) -> &[u8] {
        &self.buf[..]
    }

    pub fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..]
    }

    pub fn buf_dma(&self) -> usize {
        self.buf_dma
    }
}

/// One command as the hardware library consumes it
#[derive(Debug, Default)]
pub struct MCICmdData<'a> {
    cmdidx: u32,
    cmdarg: u32,
    response: [u32; 4],
    flag: MCICmdFlag,
    data: Option<MCIData<'a>>,
}

impl<'a> MCICmdData<'a> {
    pub fn new(cmdidx: u32, cmdarg: u32, flag: MCICmdFlag) -> Self {
        MCICmdData {
            cmdidx,
            cmdarg,
            response: [0; 4],
            flag,
            data: None,
        }
    }

    pub fn cmdidx(&self) -> u32 {
        self.cmdidx
    }

    pub fn cmdarg(&self) -> u32 {
        self.cmdarg
    }

    pub fn flag(&self) -> MCICmdFlag {
        self.flag
    }

    pub fn flag_mut(&mut self) -> &mut MCICmdFlag {
        &mut self.flag
    }

    /// Raw response words as the controller latched them
    pub fn response(&self) -> &[u32; 4] {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut [u32; 4] {
        &mut self.response
    }

    pub fn data(&self) -> Option<&MCIData<'a>> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut MCIData<'a>> {
        self.data.as_mut()
    }

    pub fn data_set(&mut self, data: Option<MCIData<'a>>) {
        self.data = data;
    }
}
