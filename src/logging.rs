use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "msearch=info,model_search=info,model_search_core=info";
const VERBOSE_FILTER: &str = "msearch=debug,model_search=debug,model_search_core=debug";

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    // A subscriber may already be installed (tests, embedding hosts).
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
