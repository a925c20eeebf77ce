//! Print dispatch via URI handoff
//!
//! The encoder itself never talks to a printer. On Android the buffer is handed
//! to the RawBT app by opening a URI: first the `rawbt:` scheme, then, after a
//! fixed delay, the `intent:` fallback. There is no completion signal from the
//! OS, so the fallback always fires. Only one dispatch may be in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};
use crate::transport::{PrintPayload, RAWBT_PACKAGE};

/// Default pause between primary and fallback launch
pub const DEFAULT_DISPATCH_DELAY: Duration = Duration::from_millis(500);

/// Trait for URI launchers
#[allow(async_fn_in_trait)]
pub trait UriLauncher {
    /// Ask the OS to open a URI
    async fn launch(&self, uri: &str) -> PrintResult<()>;
}

/// Dispatch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Pause between primary and fallback launch
    pub delay: Duration,
    /// Android package id used in the fallback intent
    pub package: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DISPATCH_DELAY,
            package: RAWBT_PACKAGE.to_string(),
        }
    }
}

/// Single-flight dispatcher
///
/// Calls that arrive while a dispatch is outstanding fail with
/// [`PrintError::Busy`] instead of queueing.
#[derive(Debug)]
pub struct PrintDispatcher<L> {
    launcher: L,
    config: DispatchConfig,
    busy: AtomicBool,
}

impl<L: UriLauncher> PrintDispatcher<L> {
    pub fn new(launcher: L, config: DispatchConfig) -> Self {
        Self {
            launcher,
            config,
            busy: AtomicBool::new(false),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Whether a dispatch is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Hand an ESC/POS buffer to the print app
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn dispatch(&self, bytes: &[u8]) -> PrintResult<()> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let payload = PrintPayload::new(bytes, &self.config.package);

        info!("Launching primary URI");
        if let Err(e) = self.launcher.launch(&payload.primary).await {
            warn!(error = %e, "Primary URI launch failed, continuing with fallback");
        }

        tokio::time::sleep(self.config.delay).await;

        info!("Launching fallback URI");
        self.launcher.launch(&payload.fallback).await?;

        info!("Print dispatch finished");
        Ok(())
    }
}

/// Holds the busy flag; clears it on drop, success or failure
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> PrintResult<Self> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Print dispatch already in progress");
            return Err(PrintError::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        uris: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl UriLauncher for Recorder {
        async fn launch(&self, uri: &str) -> PrintResult<()> {
            self.uris.lock().unwrap().push(uri.to_string());
            match self.fail_on {
                Some(prefix) if uri.starts_with(prefix) => {
                    Err(PrintError::Launch(format!("no handler for {prefix}")))
                }
                _ => Ok(()),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_fires_primary_then_fallback() {
        let dispatcher = PrintDispatcher::new(Recorder::default(), DispatchConfig::default());
        dispatcher.dispatch(&[0x1B, 0x40]).await.unwrap();

        let uris = dispatcher.launcher().uris.lock().unwrap().clone();
        assert_eq!(uris.len(), 2);
        assert_eq!(uris[0], "rawbt:base64,G0A=");
        assert!(uris[1].starts_with("intent:data%3A"));
        assert!(uris[1].ends_with("package=ru.a402d.rawbtprinter;end;"));
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_waits_configured_delay() {
        let config = DispatchConfig {
            delay: Duration::from_secs(2),
            ..DispatchConfig::default()
        };
        let dispatcher = PrintDispatcher::new(Recorder::default(), config);

        let start = tokio::time::Instant::now();
        dispatcher.dispatch(b"x").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_dispatch_is_rejected() {
        let dispatcher = PrintDispatcher::new(Recorder::default(), DispatchConfig::default());

        let (first, second) = tokio::join!(dispatcher.dispatch(b"a"), async {
            // let the first call reach its sleep
            tokio::task::yield_now().await;
            dispatcher.dispatch(b"b").await
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(PrintError::Busy)));
        assert_eq!(dispatcher.launcher().uris.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_fires_when_primary_fails() {
        let launcher = Recorder {
            fail_on: Some("rawbt:"),
            ..Recorder::default()
        };
        let dispatcher = PrintDispatcher::new(launcher, DispatchConfig::default());

        dispatcher.dispatch(b"a").await.unwrap();
        assert_eq!(dispatcher.launcher().uris.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_flag_cleared_after_failure() {
        let launcher = Recorder {
            fail_on: Some("intent:"),
            ..Recorder::default()
        };
        let dispatcher = PrintDispatcher::new(launcher, DispatchConfig::default());

        assert!(matches!(
            dispatcher.dispatch(b"a").await,
            Err(PrintError::Launch(_))
        ));
        assert!(!dispatcher.is_busy());

        // a new dispatch is accepted afterwards
        let _ = dispatcher.dispatch(b"b").await;
        assert_eq!(dispatcher.launcher().uris.lock().unwrap().len(), 4);
    }
}
