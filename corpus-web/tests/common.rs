use std::sync::OnceLock;

use corpus_common::observability::{LogConfig, LogFormat};
use corpus_config::CorpusConfigLoader;
use corpus_web::RunContext;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "corpus-tests",
            log_dir: Some(std::env::temp_dir().join("corpus-tests")),
            format: if std::env::var("CORPUS_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug",
            ..LogConfig::default()
        };

        corpus_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Context pointed at a mock server with no delays and no retries.
pub fn context_for(base_url: &str, data_dir: &std::path::Path) -> anyhow::Result<RunContext> {
    let yaml = format!(
        "data_dir: \"{}\"\nmax_retries: 0\nlink_delay_ms: 0\ncontent_delay_ms: 0\nrequest_timeout_secs: 5\nsource:\n  base_url: \"{}\"\n",
        data_dir.display(),
        base_url
    );
    let cfg = CorpusConfigLoader::new().with_yaml_str(&yaml).load()?;
    let ctx = RunContext::from_config(&cfg)?;
    ctx.layout.ensure()?;
    Ok(ctx)
}
