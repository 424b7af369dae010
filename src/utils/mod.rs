pub mod build_info;
pub mod format;

use std::sync::Once;

use tracing_subscriber::filter::Directive;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "sms_journal_core=info";

/// Initializes the global tracing subscriber, honouring `RUST_LOG` on top of the crate default.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        // A subscriber installed by the host application wins.
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}
