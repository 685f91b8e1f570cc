#[allow(unused)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MCIHostCommonCmd {
    GoIdleState = 0,
    AllSendCid = 2,
    SetDsr = 4,
    SelectCard = 7,
    SendCsd = 9,
    SendCid = 10,
    StopTransmission = 12,
    SendStatus = 13,
    GoInactiveState = 15,
    SetBlockLength = 16,
    ReadSingleBlock = 17,
    ReadMultipleBlock = 18,
    SetBlockCount = 23,
    WriteSingleBlock = 24,
    WriteMultipleBlock = 25,
    ProgramCsd = 27,
    SetWriteProtect = 28,
    ClearWriteProtect = 29,
    SendWriteProtect = 30,
    Erase = 38,
    LockUnlock = 42,
    ApplicationCommand = 55,
    GeneralCommand = 56,
    ReadOcr = 58,
}

#[allow(unused)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MCIHostSDIOCmd {
    SendRelativeAddress = 3,
    SendOperationCondition = 5,
    SendInterfaceCondition = 8,
    RWIODirect = 52,
    RWIOExtended = 53,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MCIHostResponseType {
    #[default]
    None,
    R1,
    R1b,
    R2,
    R3,
    R4,
    R5,
    R5b,
    R6,
    R7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCIHostBusWidth {
    Bit1,
    Bit4,
    Bit8,
}

impl MCIHostBusWidth {
    pub fn bits(self) -> u32 {
        match self {
            MCIHostBusWidth::Bit1 => 1,
            MCIHostBusWidth::Bit4 => 4,
            MCIHostBusWidth::Bit8 => 8,
        }
    }
}

impl TryFrom<u32> for MCIHostBusWidth {
    type Error = u32;

    /// Bus width codes used by the block framework: 0 = 1 bit, 2 = 4 bit, 3 = 8 bit
    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(MCIHostBusWidth::Bit1),
            2 => Ok(MCIHostBusWidth::Bit4),
            3 => Ok(MCIHostBusWidth::Bit8),
            _ => Err(code),
        }
    }
}
