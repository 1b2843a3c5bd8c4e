use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "kakeibo_core=info";

/// Initializes the global tracing subscriber with sensible defaults. `RUST_LOG` adds to them.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
        if fmt().with_env_filter(filter).try_init().is_err() {
            tracing::debug!("global tracing subscriber already installed");
        }
    });
}
