//! Render and blink timing.
//!
//! Two periodic tasks drive the master's screen: a tick counter that raises
//! the `render` flag every N ticks and a blink task that toggles the `blink`
//! flag. The main loop reads and clears `render` once per iteration and uses
//! `blink` to decide whether the field being edited is shown or blanked.
//!
//! The tasks only touch [`RenderFlags`]; they never see editor, sale or
//! link state.
//!
//! ```
//! use fruitpos_terminal::RenderFlags;
//!
//! let flags = RenderFlags::new(4);
//! for _ in 0..3 {
//!     flags.tick();
//! }
//! assert!(!flags.take_render());
//!
//! flags.tick();
//! assert!(flags.take_render());
//! assert!(!flags.take_render());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::config::SchedulerConfig;

/// Flags shared between the scheduler tasks and a main loop.
///
/// Single producer, single consumer per flag; relaxed ordering is enough
/// because no other memory is published through them.
#[derive(Debug)]
pub struct RenderFlags {
    render: AtomicBool,
    blink: AtomicBool,
    ticks: AtomicU8,
    ticks_per_render: u8,
}

impl RenderFlags {
    /// Create flags that raise `render` every `ticks_per_render` ticks.
    /// Zero is treated as one.
    pub fn new(ticks_per_render: u8) -> Self {
        Self {
            render: AtomicBool::new(false),
            blink: AtomicBool::new(false),
            ticks: AtomicU8::new(0),
            ticks_per_render: ticks_per_render.max(1),
        }
    }

    /// Count one tick, raising `render` when the period is reached.
    pub fn tick(&self) {
        let ticks = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if ticks >= self.ticks_per_render {
            self.ticks.store(0, Ordering::Relaxed);
            self.render.store(true, Ordering::Relaxed);
        }
    }

    pub fn toggle_blink(&self) {
        self.blink.fetch_xor(true, Ordering::Relaxed);
    }

    /// Raise `render` without waiting for the tick counter.
    pub fn request_render(&self) {
        self.render.store(true, Ordering::Relaxed);
    }

    /// Read and clear `render`.
    pub fn take_render(&self) -> bool {
        self.render.swap(false, Ordering::Relaxed)
    }

    /// `true` during the blanked half of the blink period.
    pub fn blink(&self) -> bool {
        self.blink.load(Ordering::Relaxed)
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::new(SchedulerConfig::default().ticks_per_render)
    }
}

/// Owner of the two timer tasks. Dropping it stops them.
#[derive(Debug)]
pub struct RenderScheduler {
    flags: Arc<RenderFlags>,
    tick_task: JoinHandle<()>,
    blink_task: JoinHandle<()>,
}

impl RenderScheduler {
    /// Spawn the tick and blink tasks on the current runtime.
    pub fn spawn(config: &SchedulerConfig) -> Self {
        let flags = Arc::new(RenderFlags::new(config.ticks_per_render));

        let tick_flags = Arc::clone(&flags);
        let tick_period = config.tick;
        let tick_task = tokio::spawn(async move {
            let mut interval = time::interval(tick_period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick_flags.tick();
            }
        });

        let blink_flags = Arc::clone(&flags);
        let blink_period = config.blink;
        let blink_task = tokio::spawn(async move {
            let mut interval = time::interval(blink_period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                blink_flags.toggle_blink();
            }
        });

        debug!(
            tick_ms = config.tick.as_millis() as u64,
            ticks_per_render = config.ticks_per_render,
            blink_ms = config.blink.as_millis() as u64,
            "Render scheduler started"
        );

        Self {
            flags,
            tick_task,
            blink_task,
        }
    }

    pub fn flags(&self) -> Arc<RenderFlags> {
        Arc::clone(&self.flags)
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.tick_task.abort();
        self.blink_task.abort();
    }
}
