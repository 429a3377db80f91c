use crate::error::{ExtenderError, Result};
use crate::settings::AppSettings;
use crate::video::loop_mode::LoopMode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Shared state managed by Tauri for the lifetime of the window.
pub struct AppState {
    pub settings: Mutex<AppSettings>,
    pub loop_mode: Mutex<LoopMode>,
    pub downloading: AtomicBool,
    pub processing: AtomicBool,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            loop_mode: Mutex::new(LoopMode::default()),
            downloading: AtomicBool::new(false),
            processing: AtomicBool::new(false),
        }
    }
}

/// Marks a job kind as running until dropped.
#[derive(Debug)]
pub struct JobGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> JobGuard<'a> {
    pub fn acquire(flag: &'a AtomicBool, job: &'static str) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExtenderError::Busy(job))?;
        Ok(Self { flag })
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
