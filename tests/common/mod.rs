#![allow(dead_code)]

use std::{
    collections::VecDeque,
    ptr::NonNull,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use sdif::{
    MCIHost, MCIHostCompletion, MCIHostPlatform, MCIHostRequest, MCIHostStatus,
    mci::{
        MCICmdData, MCICmdFlag, MCIConfig, MCIDmaDescRing, MCIError, MCIEventType, MCIEvtHandler,
        MCIHal, MCIId, MCIIrqContext, MCIRelaxHandler, MCIResult,
    },
    mci_host::MCIHostCardDetect,
    osa::{DmaAllocator, GlobalDmaAllocator, Osa, OsaError, OsaStatus},
};

/// What the controller saw for one submitted command
#[derive(Debug, Clone)]
pub struct Submission {
    pub cmdidx: u32,
    pub cmdarg: u32,
    pub flag: MCICmdFlag,
    pub datalen: Option<u32>,
    pub buf_ptr: usize,
    pub buf_dma: usize,
    pub payload: Vec<u8>,
}

/// State of the fake controller, shared between the test and the boxed HAL
#[derive(Default)]
pub struct MockState {
    pub handlers: Mutex<Vec<(MCIEventType, MCIEvtHandler, Arc<MCIIrqContext>)>>,
    /// Events raised right after each submission, front first
    pub script: Mutex<VecDeque<Vec<MCIEventType>>>,
    pub responses: Mutex<VecDeque<[u32; 4]>>,
    pub submissions: Mutex<Vec<Submission>>,
    pub response_fetches: AtomicUsize,
    pub fail_init: AtomicBool,
    pub fail_idma: AtomicBool,
    pub fail_submit: AtomicBool,
    pub fail_clk: AtomicBool,
    pub clocks: Mutex<Vec<u32>>,
    pub bus_widths: Mutex<Vec<(usize, u32)>>,
    pub ring: Mutex<Option<(usize, u32, usize)>>,
    pub relax: Mutex<Option<MCIRelaxHandler>>,
}

impl MockState {
    /// Run the handler registered for `evt`, as the controller interrupt would
    pub fn fire(&self, evt: MCIEventType) {
        let found = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .find(|(registered, _, _)| *registered == evt)
            .map(|(_, handler, ctx)| (*handler, ctx.clone()));

        if let Some((handler, ctx)) = found {
            handler(ctx.id(), &ctx, 0, 0);
        }
    }

    pub fn push_script(&self, events: &[MCIEventType]) {
        self.script.lock().unwrap().push_back(events.to_vec());
    }

    pub fn push_response(&self, response: [u32; 4]) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

/// Byte the fake card returns at offset `i` of a read
pub fn read_pattern(i: usize) -> u8 {
    (i * 7 + 3) as u8
}

pub struct MockHal {
    pub state: Arc<MockState>,
}

impl MCIHal for MockHal {
    fn cfg_initialize(&self, _config: &MCIConfig) -> MCIResult {
        if self.state.fail_init.load(Ordering::SeqCst) {
            return Err(MCIError::InvalidState);
        }
        Ok(())
    }

    fn set_idma_list(&self, ring: &MCIDmaDescRing) -> MCIResult {
        if self.state.fail_idma.load(Ordering::SeqCst) {
            return Err(MCIError::NotInit);
        }
        *self.state.ring.lock().unwrap() = Some((
            ring.first_desc().as_ptr() as usize,
            ring.desc_num(),
            ring.size(),
        ));
        Ok(())
    }

    fn register_relax_handler(&self, relax: MCIRelaxHandler) {
        *self.state.relax.lock().unwrap() = Some(relax);
    }

    fn register_evt_handler(
        &self,
        evt: MCIEventType,
        handler: MCIEvtHandler,
        args: Arc<MCIIrqContext>,
    ) {
        self.state.handlers.lock().unwrap().push((evt, handler, args));
    }

    fn dma_transfer(&self, cmd_data: &mut MCICmdData<'_>) -> MCIResult {
        let flag = cmd_data.flag();
        let mut submission = Submission {
            cmdidx: cmd_data.cmdidx(),
            cmdarg: cmd_data.cmdarg(),
            flag,
            datalen: None,
            buf_ptr: 0,
            buf_dma: 0,
            payload: Vec::new(),
        };

        if self.state.fail_submit.load(Ordering::SeqCst) {
            self.state.submissions.lock().unwrap().push(submission);
            return Err(MCIError::Busy);
        }

        let has_data = cmd_data.data().is_some();
        if let Some(data) = cmd_data.data_mut() {
            submission.datalen = Some(data.datalen());
            submission.buf_dma = data.buf_dma();
            let buf = data.buf_mut();
            submission.buf_ptr = buf.as_ptr() as usize;
            if flag.contains(MCICmdFlag::READ_DATA) {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = read_pattern(i);
                }
            } else {
                submission.payload = buf.to_vec();
            }
        }
        self.state.submissions.lock().unwrap().push(submission);

        let events = self.state.script.lock().unwrap().pop_front();
        let events = events.unwrap_or_else(|| {
            if has_data {
                vec![MCIEventType::CmdDone, MCIEventType::DataDone]
            } else {
                vec![MCIEventType::CmdDone]
            }
        });
        for evt in events {
            self.state.fire(evt);
        }

        Ok(())
    }

    fn get_cmd_response(&self, cmd_data: &mut MCICmdData<'_>) -> MCIResult {
        self.state.response_fetches.fetch_add(1, Ordering::SeqCst);
        let response = self
            .state
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        *cmd_data.response_mut() = response;
        Ok(())
    }

    fn set_clk_freq(&self, clk_hz: u32) -> MCIResult {
        if self.state.fail_clk.load(Ordering::SeqCst) {
            return Err(MCIError::InvalidTiming);
        }
        self.state.clocks.lock().unwrap().push(clk_hz);
        Ok(())
    }

    fn set_bus_width(&self, base_addr: usize, width: u32) {
        self.state.bus_widths.lock().unwrap().push((base_addr, width));
    }
}

type Alarm = (Duration, Box<dyn FnOnce() + Send>);

/// Virtual clock, sleeping only moves time forward
#[derive(Default)]
pub struct MockOsa {
    now_us: AtomicU64,
    alarm: Mutex<Option<Alarm>>,
}

impl MockOsa {
    /// Run `action` once the clock reaches `at`
    pub fn set_alarm(&self, at: Duration, action: impl FnOnce() + Send + 'static) {
        *self.alarm.lock().unwrap() = Some((at, Box::new(action)));
    }
}

impl Osa for MockOsa {
    fn uptime(&self) -> Duration {
        Duration::from_micros(self.now_us.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.now_us
            .fetch_add(duration.as_micros() as u64, Ordering::SeqCst);

        let now = self.uptime();
        let mut alarm = self.alarm.lock().unwrap();
        if alarm.as_ref().is_some_and(|(at, _)| now >= *at) {
            if let Some((_, action)) = alarm.take() {
                drop(alarm);
                action();
            }
        }
    }
}

/// Wall clock for tests that raise events from another thread
pub struct StdOsa {
    origin: Instant,
}

impl Default for StdOsa {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Osa for StdOsa {
    fn uptime(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Heap allocator that counts what it hands out and can be told to fail
#[derive(Default)]
pub struct CountingAllocator {
    pub allocs: AtomicUsize,
    pub frees: AtomicUsize,
    pub fail: AtomicBool,
    pub aligns: Mutex<Vec<usize>>,
}

impl CountingAllocator {
    pub fn outstanding(&self) -> usize {
        self.allocs.load(Ordering::SeqCst) - self.frees.load(Ordering::SeqCst)
    }
}

impl DmaAllocator for CountingAllocator {
    fn alloc_aligned(&self, size: usize, align: usize) -> OsaStatus<NonNull<u8>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(OsaError::BadMalloc);
        }
        let addr = GlobalDmaAllocator.alloc_aligned(size, align)?;
        self.allocs.fetch_add(1, Ordering::SeqCst);
        self.aligns.lock().unwrap().push(align);
        Ok(addr)
    }

    unsafe fn dealloc(&self, addr: NonNull<u8>, size: usize, align: usize) {
        self.frees.fetch_add(1, Ordering::SeqCst);
        unsafe { GlobalDmaAllocator.dealloc(addr, size, align) }
    }
}

/// Outcome of one finished request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub id: MCIId,
    pub cmd: u32,
    pub cmd_err: MCIHostStatus,
    pub stop_err: Option<MCIHostStatus>,
    /// Scratch regions still alive when the framework was called back
    pub outstanding: usize,
}

pub struct CompletionRecorder {
    pub done: Mutex<Vec<Completed>>,
    allocator: Arc<CountingAllocator>,
}

impl CompletionRecorder {
    pub fn new(allocator: Arc<CountingAllocator>) -> Self {
        Self {
            done: Mutex::new(Vec::new()),
            allocator,
        }
    }

    pub fn done(&self) -> Vec<Completed> {
        self.done.lock().unwrap().clone()
    }
}

impl MCIHostCompletion for CompletionRecorder {
    fn request_complete(&self, id: MCIId, req: &MCIHostRequest<'_>) {
        self.done.lock().unwrap().push(Completed {
            id,
            cmd: req.cmd().index(),
            cmd_err: req.cmd().err(),
            stop_err: req.stop().map(|stop| stop.err()),
            outstanding: self.allocator.outstanding(),
        });
    }
}

#[derive(Default)]
pub struct HotplugRecorder {
    pub changed: Mutex<Vec<MCIId>>,
}

impl MCIHostCardDetect for HotplugRecorder {
    fn card_changed(&self, id: MCIId) {
        self.changed.lock().unwrap().push(id);
    }
}

/// Everything a test needs to drive one host
pub struct Fixture {
    pub state: Arc<MockState>,
    pub osa: Arc<MockOsa>,
    pub allocator: Arc<CountingAllocator>,
    pub completion: Arc<CompletionRecorder>,
    pub hotplug: Arc<HotplugRecorder>,
}

impl Fixture {
    pub fn new() -> Self {
        let allocator = Arc::new(CountingAllocator::default());
        Self {
            state: Arc::new(MockState::default()),
            osa: Arc::new(MockOsa::default()),
            completion: Arc::new(CompletionRecorder::new(allocator.clone())),
            allocator,
            hotplug: Arc::new(HotplugRecorder::default()),
        }
    }

    pub fn hal(&self) -> Box<dyn MCIHal> {
        Box::new(MockHal {
            state: self.state.clone(),
        })
    }

    pub fn platform(&self) -> MCIHostPlatform {
        MCIHostPlatform::new(
            self.osa.clone(),
            self.allocator.clone(),
            self.completion.clone(),
        )
        .with_card_detect(self.hotplug.clone())
    }

    pub fn host(&self, id: MCIId) -> MCIHost {
        MCIHost::new(id, self.hal(), self.platform()).unwrap()
    }
}

/// Stack buffer the IDMA can use as is
#[repr(C, align(512))]
pub struct AlignedBuf(pub [u8; 2048]);

impl AlignedBuf {
    pub fn new() -> Box<Self> {
        Box::new(AlignedBuf([0; 2048]))
    }
}
