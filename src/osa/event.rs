//! Event flag group shared between interrupt handlers and one waiting thread
use bitflags::{Flags, bitflags};
use core::{
    marker::PhantomData,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use super::{
    Osa,
    err::{OsaError, OsaStatus},
};

/// Interval between two checks of the flag word while a receiver waits
pub const OSA_EVENT_POLL_INTERVAL: Duration = Duration::from_millis(1);

bitflags! {
    /// How `recv` matches and consumes flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OsaEventOpt: u32 {
        /// every requested flag must be set
        const AND = 1 << 0;
        /// any requested flag is enough
        const OR = 1 << 1;
        /// consume the matched flags
        const CLEAR = 1 << 2;
    }
}

/// A set of typed flags that producers raise and a consumer waits on
///
/// `send` may be called from any number of interrupt contexts at once, it
/// only ORs bits in. A successful `recv` with [`OsaEventOpt::CLEAR`] removes
/// exactly the matched bits in one atomic step, so flags raised concurrently
/// for other bits are never lost.
pub struct OsaEvent<F> {
    set: AtomicU32,
    _flags: PhantomData<F>,
}

impl<F: Flags<Bits = u32>> OsaEvent<F> {
    pub const fn new() -> Self {
        Self {
            set: AtomicU32::new(0),
            _flags: PhantomData,
        }
    }

    /// Raise `flags`, never blocks
    pub fn send(&self, flags: F) {
        self.set.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    /// Flags raised and not consumed yet
    pub fn pending(&self) -> F {
        F::from_bits_retain(self.set.load(Ordering::Acquire))
    }

    /// Drop every pending flag
    pub fn reset(&self) {
        self.set.store(0, Ordering::Release);
    }

    /// Check once for `flags` without waiting
    pub fn try_recv(&self, flags: F, opt: OsaEventOpt) -> Option<F> {
        let want = flags.bits();
        let mut cur = self.set.load(Ordering::Acquire);

        loop {
            let matched = if opt.contains(OsaEventOpt::AND) {
                cur & want == want
            } else {
                cur & want != 0
            };
            if !matched {
                return None;
            }

            let hit = cur & want;
            if !opt.contains(OsaEventOpt::CLEAR) {
                return Some(F::from_bits_retain(hit));
            }

            match self
                .set
                .compare_exchange_weak(cur, cur & !hit, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Some(F::from_bits_retain(hit)),
                Err(actual) => cur = actual,
            }
        }
    }

    /// Wait up to `timeout` for `flags`, yielding through `osa` between checks
    pub fn recv(&self, flags: F, opt: OsaEventOpt, timeout: Duration, osa: &dyn Osa) -> OsaStatus<F>
    where
        F: Copy,
    {
        let start = osa.uptime();

        loop {
            if let Some(hit) = self.try_recv(flags, opt) {
                return Ok(hit);
            }
            if osa.uptime().saturating_sub(start) >= timeout {
                return Err(OsaError::Timeout);
            }
            osa.sleep(OSA_EVENT_POLL_INTERVAL);
        }
    }
}

impl<F: Flags<Bits = u32>> Default for OsaEvent<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Flags<Bits = u32> + core::fmt::Debug> core::fmt::Debug for OsaEvent<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OsaEvent")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicU64;

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Bits: u32 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
        }
    }

    #[derive(Default)]
    struct FakeClock {
        now_us: AtomicU64,
    }

    impl Osa for FakeClock {
        fn uptime(&self) -> Duration {
            Duration::from_micros(self.now_us.load(Ordering::SeqCst))
        }

        fn sleep(&self, duration: Duration) {
            self.now_us
                .fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
        }
    }

    const AND_CLEAR: OsaEventOpt = OsaEventOpt::AND.union(OsaEventOpt::CLEAR);
    const OR_CLEAR: OsaEventOpt = OsaEventOpt::OR.union(OsaEventOpt::CLEAR);

    #[test]
    fn and_needs_every_flag() {
        let event = OsaEvent::<Bits>::new();
        event.send(Bits::A);
        assert_eq!(event.try_recv(Bits::A | Bits::B, AND_CLEAR), None);
        assert_eq!(event.pending(), Bits::A);

        event.send(Bits::B);
        assert_eq!(event.try_recv(Bits::A | Bits::B, AND_CLEAR), Some(Bits::A | Bits::B));
        assert!(event.pending().is_empty());
    }

    #[test]
    fn clear_only_consumes_matched_flags() {
        let event = OsaEvent::<Bits>::new();
        event.send(Bits::A | Bits::C);
        assert_eq!(event.try_recv(Bits::A, AND_CLEAR), Some(Bits::A));
        assert_eq!(event.pending(), Bits::C);
    }

    #[test]
    fn or_matches_any_flag() {
        let event = OsaEvent::<Bits>::new();
        event.send(Bits::B);
        assert_eq!(event.try_recv(Bits::A | Bits::B, OR_CLEAR), Some(Bits::B));
        assert!(event.pending().is_empty());
    }

    #[test]
    fn without_clear_flags_stay_pending() {
        let event = OsaEvent::<Bits>::new();
        event.send(Bits::A);
        assert_eq!(event.try_recv(Bits::A, OsaEventOpt::AND), Some(Bits::A));
        assert_eq!(event.pending(), Bits::A);
    }

    #[test]
    fn recv_times_out_after_the_window() {
        let clock = FakeClock::default();
        let event = OsaEvent::<Bits>::new();
        event.send(Bits::A);

        let ret = event.recv(
            Bits::A | Bits::B,
            AND_CLEAR,
            Duration::from_millis(5000),
            &clock,
        );
        assert_eq!(ret, Err(OsaError::Timeout));
        assert!(clock.uptime() >= Duration::from_millis(5000));
        assert_eq!(event.pending(), Bits::A);
    }

    #[test]
    fn recv_returns_immediately_when_already_set() {
        let clock = FakeClock::default();
        let event = OsaEvent::<Bits>::new();
        event.send(Bits::C);
        let ret = event.recv(Bits::C, OR_CLEAR, Duration::from_millis(5000), &clock);
        assert_eq!(ret, Ok(Bits::C));
        assert_eq!(clock.uptime(), Duration::ZERO);
    }
}
