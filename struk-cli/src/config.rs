use std::time::Duration;

use struk_printer::{
    DEFAULT_DISPATCH_DELAY, DEFAULT_FOOTER, DEFAULT_WIDTH, DispatchConfig, PrintResult,
    RAWBT_PACKAGE, TextPolicy,
};

/// CLI configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | STRUK_PAPER_WIDTH | 32 | printable columns |
/// | STRUK_TEXT_POLICY | lossy | `lossy` or `strict` |
/// | STRUK_FOOTER | Terima kasih! | footer when the receipt has none |
/// | STRUK_RAWBT_PACKAGE | ru.a402d.rawbtprinter | package in the intent URI |
/// | STRUK_DISPATCH_DELAY_MS | 500 | pause before the fallback URI |
/// | STRUK_LAUNCH_CMD | xdg-open | program that opens each URI |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub paper_width: usize,
    pub text_policy: TextPolicy,
    pub footer: String,
    pub rawbt_package: String,
    pub dispatch_delay_ms: u64,
    pub launch_cmd: String,
}

impl Config {
    /// Load from the process environment
    ///
    /// Unparsable numbers fall back to their default; an unknown text
    /// policy is an error.
    pub fn from_env() -> PrintResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> PrintResult<Self> {
        let text_policy = match get("STRUK_TEXT_POLICY") {
            Some(v) => v.parse()?,
            None => TextPolicy::default(),
        };

        Ok(Self {
            paper_width: get("STRUK_PAPER_WIDTH")
                .and_then(|v| v.parse().ok())
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_WIDTH),
            text_policy,
            footer: get("STRUK_FOOTER").unwrap_or_else(|| DEFAULT_FOOTER.into()),
            rawbt_package: get("STRUK_RAWBT_PACKAGE").unwrap_or_else(|| RAWBT_PACKAGE.into()),
            dispatch_delay_ms: get("STRUK_DISPATCH_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DISPATCH_DELAY.as_millis() as u64),
            launch_cmd: get("STRUK_LAUNCH_CMD").unwrap_or_else(|| "xdg-open".into()),
        })
    }

    pub fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            delay: Duration::from_millis(self.dispatch_delay_ms),
            package: self.rawbt_package.clone(),
        }
    }
}
