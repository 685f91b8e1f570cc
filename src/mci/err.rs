/// Status reported by the SDIF hardware library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCIError {
    Timeout,
    NotInit,
    ShortBuf,
    NotSupport,
    InvalidState,
    TransTimeout,
    CmdTimeout,
    NoCard,
    Busy,
    DmaBufUnalign,
    InvalidTiming,
}

pub type MCIResult<T = ()> = Result<T, MCIError>;
