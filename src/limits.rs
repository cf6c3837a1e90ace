//! Process CPU-time budget
//!
//! The budget is a soft `RLIMIT_CPU`. Once it is spent the kernel sends
//! SIGXCPU and the process ends; nothing in the library observes it.

use crate::error::{Error, Result};

/// Install a CPU-time limit of `seconds` for the current process
#[cfg(unix)]
pub fn set_cpu_limit(seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(Error::InvalidConfig(
            "cpu time limit must be at least 1 second".into(),
        ));
    }

    let mut current = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `current` is a valid, writable rlimit
    if unsafe { libc::getrlimit(libc::RLIMIT_CPU, &mut current) } != 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    let requested = seconds as libc::rlim_t;
    let soft = if current.rlim_max == libc::RLIM_INFINITY {
        requested
    } else {
        requested.min(current.rlim_max)
    };
    let limit = libc::rlimit {
        rlim_cur: soft,
        rlim_max: current.rlim_max,
    };
    // SAFETY: `limit` is a valid rlimit that outlives the call
    if unsafe { libc::setrlimit(libc::RLIMIT_CPU, &limit) } != 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    tracing::info!(seconds = soft, "cpu time limit installed");
    Ok(())
}

#[cfg(not(unix))]
pub fn set_cpu_limit(seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(Error::InvalidConfig(
            "cpu time limit must be at least 1 second".into(),
        ));
    }
    tracing::warn!(seconds, "cpu time limits are not supported on this platform, ignoring");
    Ok(())
}
