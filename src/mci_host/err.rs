/// Why a host operation or one command of a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCIHostError {
    /// Scratch buffer or descriptor ring could not be allocated
    OutOfMemory,
    /// The hardware library refused to start the command
    SubmissionFailed,
    /// The controller raised its error event while the command was pending
    HardwareIo,
    /// The wait policy deadline passed before the command completed
    Timeout,
    /// Command code reserved for SDIO, never sent to the controller
    CmdNotSupport,
    /// Another transfer is still in flight on this host
    Busy,
    InvalidArgument,
    ClockSetFailed,
    HardwareInitFailed,
    AlreadyInit,
}

pub type MCIHostStatus<T = ()> = Result<T, MCIHostError>;
