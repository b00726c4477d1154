//! Diagnostic logging for the tscc binary.
//!
//! Nothing is installed unless `TSCC_LOG` or `RUST_LOG` carries filter
//! directives. `TSCC_LOG_FORMAT` selects `text`, `tree` or `json` rendering,
//! always on stderr.
//!
//! ```bash
//! TSCC_LOG=tscc_emitter=trace TSCC_LOG_FORMAT=tree tscc -p app
//! ```

use std::str::FromStr;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const FILTER_VAR: &str = "TSCC_LOG";
const FALLBACK_FILTER_VAR: &str = "RUST_LOG";
const FORMAT_VAR: &str = "TSCC_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(Self::Text),
            "tree" => Ok(Self::Tree),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Filter directives and rendering read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub directives: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// `None` when neither filter variable is set. `TSCC_LOG` shadows
    /// `RUST_LOG`; an unrecognized format falls back to text.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let directives = lookup(FILTER_VAR).or_else(|| lookup(FALLBACK_FILTER_VAR))?;
        let format = lookup(FORMAT_VAR)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        Some(Self { directives, format })
    }

    fn into_layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let filter = EnvFilter::builder().parse_lossy(&self.directives);
        match self.format {
            LogFormat::Text => fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
            LogFormat::Tree => tracing_tree::HierarchicalLayer::new(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true)
                .with_filter(filter)
                .boxed(),
        }
    }
}

/// Install the global subscriber if the environment asks for one.
pub fn init_tracing() {
    let Some(settings) = LogSettings::from_lookup(|name| std::env::var(name).ok()) else {
        return;
    };
    Registry::default().with(settings.into_layer()).init();
}
