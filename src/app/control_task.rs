//! Control-loop runner.
//!
//! Owns the [`SteeringService`], the [`TickScheduler`] and the actuator,
//! and runs them on a dedicated thread until [`SharedSteering::request_stop`]
//! is called.  Teardown order is fixed: the in-flight tick finishes, the
//! loop exits, the output is disabled, then the bus is released.  The same
//! teardown runs from `Drop` if the loop unwinds.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use core::time::Duration;

use log::{error, info};

use crate::config::SteeringConfig;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::drivers::watchdog::Watchdog;
use crate::error::Result;
use crate::scheduler::TickScheduler;

use super::ports::{ActuatorPort, EventSink, TimePort};
use super::service::SteeringService;
use super::shared::SharedSteering;

const TASK_NAME: &str = "steer\0";
const TASK_PRIORITY: u8 = 20;
const TASK_STACK_KB: usize = 8;
const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs `shutdown()` on the wrapped actuator when dropped.
struct ActuatorGuard<A: ActuatorPort>(A);

impl<A: ActuatorPort> Drop for ActuatorGuard<A> {
    fn drop(&mut self) {
        self.0.shutdown();
    }
}

pub struct ControlTask<A, T, S> {
    service: SteeringService,
    scheduler: TickScheduler,
    shared: Arc<SharedSteering>,
    hw: A,
    clock: T,
    sink: S,
}

impl<A, T, S> ControlTask<A, T, S>
where
    A: ActuatorPort,
    T: TimePort,
    S: EventSink,
{
    pub fn new(
        config: &SteeringConfig,
        shared: Arc<SharedSteering>,
        hw: A,
        clock: T,
        sink: S,
    ) -> Result<Self> {
        Ok(Self {
            service: SteeringService::new(config)?,
            scheduler: TickScheduler::new(config.tick_interval()),
            shared,
            hw,
            clock,
            sink,
        })
    }

    /// Block the calling thread running ticks until a stop is requested.
    /// Returns the number of ticks executed.
    pub fn run(self) -> u64 {
        let Self {
            mut service,
            mut scheduler,
            shared,
            hw,
            clock,
            mut sink,
        } = self;
        let mut hw = ActuatorGuard(hw);
        let watchdog = Watchdog::new(WATCHDOG_TIMEOUT);

        service.start(&shared, &mut hw.0, &mut sink);
        scheduler.start(clock.now_us());

        while shared.is_running() {
            let wait = scheduler.time_until_due(clock.now_us());
            if !wait.is_zero() {
                std::thread::sleep(wait);
                continue;
            }
            let now = clock.now_us();
            let dt = scheduler.begin_tick(now);
            service.tick(now, dt, &shared, &mut hw.0, &mut sink);
            shared.set_overruns(scheduler.overruns());
            watchdog.feed();
        }

        drop(watchdog);
        // Explicit teardown; the guard's second shutdown is a no-op.
        service.stop(&mut hw.0, &mut sink);
        service.tick_count()
    }
}

impl<A, T, S> ControlTask<A, T, S>
where
    A: ActuatorPort + Send + 'static,
    T: TimePort + Send + 'static,
    S: EventSink + Send + 'static,
{
    /// Run the loop on its own thread, pinned to the application core.
    pub fn spawn(self) -> io::Result<ControlTaskHandle> {
        let shared = Arc::clone(&self.shared);
        let thread = spawn_on_core(Core::App, TASK_PRIORITY, TASK_STACK_KB, TASK_NAME, move || {
            let ticks = self.run();
            info!("control task exited after {} ticks", ticks);
        })?;
        Ok(ControlTaskHandle {
            shared,
            thread: Some(thread),
        })
    }
}

/// Handle to a spawned control task.  Dropping it stops the task.
pub struct ControlTaskHandle {
    shared: Arc<SharedSteering>,
    thread: Option<JoinHandle<()>>,
}

impl ControlTaskHandle {
    pub fn shared(&self) -> &Arc<SharedSteering> {
        &self.shared
    }

    /// True if the loop thread has exited (stopped or panicked).
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Request stop and wait for the output to be disabled and released.
    /// Returns `false` if the loop thread panicked.
    pub fn shutdown(mut self) -> bool {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> bool {
        self.shared.request_stop();
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(()) => true,
                Err(_) => {
                    error!("control task panicked");
                    false
                }
            },
            None => true,
        }
    }
}

impl Drop for ControlTaskHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
