use anyhow::{Context, Result};
use chrono::Duration;
use spanweave_engine::AssembleOptions;
use spanweave_providers::{ParseMode, load_spans};
use spanweave_types::Span;
use std::path::Path;

use crate::args::Cli;
use crate::config::{Config, gap_duration};
use crate::types::OutputFormat;

/// Settings shared by every command, after merging flags over config.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub config: Config,
    pub format: OutputFormat,
    pub parse_mode: ParseMode,
}

impl ExecutionContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::resolve(cli.config.as_deref())?;
        let format = cli.format.unwrap_or(config.output.format);
        let parse_mode = if cli.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        };

        Ok(Self {
            config,
            format,
            parse_mode,
        })
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn load_spans(&self, input: &Path) -> Result<Vec<Span>> {
        let parsed = load_spans(input, self.parse_mode)
            .with_context(|| format!("Failed to read spans from {}", input.display()))?;

        if parsed.report.skipped_count() > 0 {
            tracing::warn!(
                skipped = parsed.report.skipped_count(),
                records = parsed.report.records,
                "skipped malformed records in {}",
                input.display()
            );
        }
        tracing::info!(spans = parsed.spans.len(), "loaded spans");
        Ok(parsed.spans)
    }

    /// Gap threshold from the flag, else config.
    pub fn gap_threshold(&self, override_secs: Option<u64>) -> Duration {
        override_secs
            .map(gap_duration)
            .unwrap_or_else(|| self.config.gap_threshold())
    }

    /// Assembly options; segmentation runs when requested here or in config.
    pub fn assemble_options(&self, segment: bool, gap_override: Option<u64>) -> AssembleOptions {
        let segment = segment || self.config.engine.segment;
        AssembleOptions {
            gap_threshold: segment.then(|| self.gap_threshold(gap_override)),
            canonicalizer: self.config.canonicalizer(),
        }
    }
}
