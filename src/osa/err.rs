#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsaError {
    InvalidBuf,
    BadMalloc,
    // PoolBuffer size too small to copy contents from a slice
    NotEnoughSpace,
    // Event wait expired before the requested flags showed up
    Timeout,
}

pub type OsaStatus<T = ()> = Result<T, OsaError>;
