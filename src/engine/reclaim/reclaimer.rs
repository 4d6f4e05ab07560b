use crate::engine::errors::{PlatformError, ReclaimError};

/// The single OS call that asks the kernel to give memory back.
pub trait Reclaimer: Send + Sync {
    fn reclaim(&self) -> Result<(), ReclaimError>;
}

/// Fails on every OS but Windows.
pub fn ensure_supported_platform() -> Result<(), PlatformError> {
    if cfg!(windows) {
        Ok(())
    } else {
        Err(PlatformError::Unsupported(std::env::consts::OS))
    }
}

/// Trims the working set of every process this user may touch.
///
/// The current process is trimmed first and must succeed; other processes
/// are best effort, since protected and elevated ones refuse the handle.
#[derive(Debug)]
pub struct WorkingSetTrimmer {
    _private: (),
}

impl WorkingSetTrimmer {
    pub fn new() -> Result<Self, PlatformError> {
        ensure_supported_platform()?;
        Ok(Self { _private: () })
    }
}

impl Reclaimer for WorkingSetTrimmer {
    #[cfg(windows)]
    fn reclaim(&self) -> Result<(), ReclaimError> {
        win::trim_all_working_sets()
    }

    #[cfg(not(windows))]
    fn reclaim(&self) -> Result<(), ReclaimError> {
        Err(ReclaimError::Platform(format!(
            "working set trimming is unavailable on {}",
            std::env::consts::OS
        )))
    }
}

#[cfg(windows)]
mod win {
    use tracing::debug;
    use windows::Win32::Foundation::{CloseHandle, E_ACCESSDENIED};
    use windows::Win32::System::ProcessStatus::{EmptyWorkingSet, EnumProcesses};
    use windows::Win32::System::Threading::{
        GetCurrentProcess, GetCurrentProcessId, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
        PROCESS_SET_QUOTA, SetProcessWorkingSetSize,
    };

    use crate::engine::errors::ReclaimError;

    const MAX_PIDS: usize = 4096;

    pub(super) fn trim_all_working_sets() -> Result<(), ReclaimError> {
        unsafe {
            // (SIZE_T)-1 for both bounds removes as many pages as possible.
            SetProcessWorkingSetSize(GetCurrentProcess(), usize::MAX, usize::MAX).map_err(
                |e| {
                    if e.code() == E_ACCESSDENIED {
                        ReclaimError::PermissionDenied(e.message())
                    } else {
                        ReclaimError::Platform(e.message())
                    }
                },
            )?;
        }

        let mut pids = vec![0u32; MAX_PIDS];
        let mut needed = 0u32;
        unsafe {
            EnumProcesses(
                pids.as_mut_ptr(),
                (pids.len() * std::mem::size_of::<u32>()) as u32,
                &mut needed,
            )
            .map_err(|e| ReclaimError::Platform(e.message()))?;
        }
        let count = needed as usize / std::mem::size_of::<u32>();
        let own_pid = unsafe { GetCurrentProcessId() };

        let mut trimmed = 0usize;
        let mut skipped = 0usize;
        for &pid in pids.iter().take(count) {
            if pid == 0 || pid == own_pid {
                continue;
            }
            let handle = match unsafe {
                OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION | PROCESS_SET_QUOTA, false, pid)
            } {
                Ok(handle) => handle,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            if unsafe { EmptyWorkingSet(handle) }.is_ok() {
                trimmed += 1;
            } else {
                skipped += 1;
            }
            unsafe {
                let _ = CloseHandle(handle);
            }
        }

        debug!(trimmed, skipped, "Trimmed process working sets");
        Ok(())
    }
}
