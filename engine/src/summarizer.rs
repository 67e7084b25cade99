//! Conversation summarizer
//!
//! Lines are bucketed by priority keywords, then each bucket is compressed
//! with its own retention rate:
//!
//! - P0: kept verbatim
//! - P1: `1 - rate * 0.2` of the prose sentences
//! - P2: `1 - rate * 0.4` of the prose sentences
//!
//! Structural lines (diff markers, file paths, speaker labels, fenced code)
//! are never compressed. The raw transcript is archived before anything is
//! transformed.

use chrono::Local;
use regex::Regex;
use sdk::errors::EngineError;
use sdk::types::{MemoryCategory, Priority, SummarizerArgs, SummaryResult, SummaryType};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::analysis::rules::compile;
use crate::config::{Config, PrioritiesConfig};
use crate::llm::{self, LLMProvider};
use crate::memory_bank::{fs_safe_stamp, MemoryBank};

/// Share of prose sentences kept for a priority at a compression rate
pub fn retention(priority: Priority, rate: f64) -> f64 {
    match priority {
        Priority::P0 => 1.0,
        Priority::P1 => 1.0 - rate * 0.2,
        Priority::P2 => 1.0 - rate * 0.4,
    }
}

/// `ceil(total * retention)`, tolerant of float noise and never above `total`
pub fn retained_count(total: usize, retention: f64) -> usize {
    let exact = total as f64 * retention.clamp(0.0, 1.0);
    let rounded = exact.round();
    let kept = if (exact - rounded).abs() < 1e-9 {
        rounded
    } else {
        exact.ceil()
    };
    (kept as usize).min(total)
}

/// Split prose into sentences at `.`, `!` or `?` followed by whitespace
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Keep the first `ceil(n * retention)` sentences; the flag is set when
/// anything was dropped
pub fn condense_prose(text: &str, retention: f64) -> (Vec<String>, bool) {
    let mut sentences = split_sentences(text);
    let keep = retained_count(sentences.len(), retention);
    let truncated = keep < sentences.len();
    sentences.truncate(keep);
    (sentences, truncated)
}

/// Recognizes lines that must survive compression untouched
pub struct LineClassifier {
    file_path: Regex,
    speaker: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            file_path: compile(r"^(?:\.{0,2}/)?(?:[\w.@-]+/)*[\w@-]+\.[A-Za-z0-9]{1,6}(?::\d+)*$")?,
            speaker: compile(
                r"(?i)^[#*\s]*(user|assistant|human|ai|system|developer)[*\s]*:?[*\s]*$",
            )?,
        })
    }

    pub fn is_fence(line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed.starts_with("```") || trimmed.starts_with("~~~")
    }

    fn is_diff(line: &str) -> bool {
        if line.starts_with("@@") || line.starts_with("diff --git") {
            return true;
        }
        let mut chars = line.chars();
        matches!(chars.next(), Some('+') | Some('-'))
            && chars.next().is_some_and(|c| !c.is_whitespace())
    }

    /// Structural outside a code fence (fenced lines are tracked by the caller)
    pub fn is_structural(&self, line: &str) -> bool {
        let trimmed = line.trim();
        Self::is_fence(trimmed)
            || Self::is_diff(trimmed)
            || self.file_path.is_match(trimmed)
            || self.speaker.is_match(trimmed)
    }
}

/// Compress one bucket of lines
///
/// Prose is condensed into one paragraph, followed by the structural lines
/// in their original order. `drop_structural` omits the latter.
pub fn compress_lines(
    classifier: &LineClassifier,
    lines: &[String],
    retention: f64,
    drop_structural: bool,
) -> String {
    let mut prose = Vec::new();
    let mut structural = Vec::new();
    let mut in_fence = false;

    for line in lines {
        if LineClassifier::is_fence(line) {
            in_fence = !in_fence;
            structural.push(line.as_str());
        } else if in_fence || classifier.is_structural(line) {
            structural.push(line.as_str());
        } else if !line.trim().is_empty() {
            prose.push(line.trim());
        }
    }

    let mut out = String::new();
    let (sentences, truncated) = condense_prose(&prose.join(" "), retention);
    if !sentences.is_empty() {
        out.push_str(&sentences.join(" "));
        if truncated {
            out.push_str(" ...");
        }
        out.push('\n');
    }
    if !drop_structural && !structural.is_empty() {
        out.push_str(&structural.join("\n"));
        out.push('\n');
    }
    out
}

/// Lines of a transcript grouped by priority
#[derive(Debug, Default, PartialEq)]
pub struct Buckets {
    pub p0: Vec<String>,
    pub p1: Vec<String>,
    pub p2: Vec<String>,
}

/// Assign a line to P0 or P1 when it contains one of their keywords
pub fn classify(line: &str, priorities: &PrioritiesConfig) -> Priority {
    if priorities.p0.iter().any(|k| line.contains(k.as_str())) {
        Priority::P0
    } else if priorities.p1.iter().any(|k| line.contains(k.as_str())) {
        Priority::P1
    } else {
        Priority::P2
    }
}

/// Bucket every line; a fenced block follows the line that opened it
pub fn bucket(transcript: &str, priorities: &PrioritiesConfig) -> Buckets {
    let mut buckets = Buckets::default();
    let mut fence_priority: Option<Priority> = None;

    for line in transcript.lines() {
        let priority = match fence_priority {
            Some(p) => {
                if LineClassifier::is_fence(line) {
                    fence_priority = None;
                }
                p
            }
            None => {
                let p = classify(line, priorities);
                if LineClassifier::is_fence(line) {
                    fence_priority = Some(p);
                }
                p
            }
        };

        let target = match priority {
            Priority::P0 => &mut buckets.p0,
            Priority::P1 => &mut buckets.p1,
            Priority::P2 => &mut buckets.p2,
        };
        target.push(line.to_string());
    }
    buckets
}

pub struct Summarizer {
    bank: MemoryBank,
    priorities: PrioritiesConfig,
    workspace: PathBuf,
    enhancer: Option<Arc<dyn LLMProvider>>,
    classifier: LineClassifier,
}

impl Summarizer {
    pub fn new(
        config: &Config,
        bank: MemoryBank,
        enhancer: Option<Arc<dyn LLMProvider>>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            bank,
            priorities: config.priorities.clone(),
            workspace: config.core.workspace.clone(),
            enhancer,
            classifier: LineClassifier::new()?,
        })
    }

    /// Compression rate to use: the override if valid, else the default
    pub fn effective_rate(&self, requested: Option<f64>) -> Result<f64, EngineError> {
        match requested {
            Some(rate) if (0.0..=1.0).contains(&rate) => Ok(rate),
            Some(rate) => Err(EngineError::InvalidParameter(format!(
                "compression rate {} is outside 0.0-1.0",
                rate
            ))),
            None => Ok(self.priorities.default_compression_rate),
        }
    }

    /// Compress a whole document at a single priority
    pub fn condense(&self, text: &str, priority: Priority, rate: f64) -> String {
        if priority == Priority::P0 {
            return text.to_string();
        }
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        compress_lines(&self.classifier, &lines, retention(priority, rate), false)
    }

    /// Render the three-section summary document
    pub fn render(&self, transcript: &str, summary_type: SummaryType, rate: f64) -> String {
        let buckets = bucket(transcript, &self.priorities);
        let p1 = compress_lines(
            &self.classifier,
            &buckets.p1,
            retention(Priority::P1, rate),
            false,
        );
        let p2 = compress_lines(
            &self.classifier,
            &buckets.p2,
            retention(Priority::P2, rate),
            summary_type == SummaryType::Concise,
        );

        let mut critical = buckets.p0.join("\n");
        if !critical.is_empty() {
            critical.push('\n');
        }

        format!(
            "# Session Summary - {}\n\n### Critical Actions\n{}\n### Key Discussions (High Priority)\n{}\n### General Discussion\n{}",
            Local::now().format("%Y-%m-%d"),
            critical,
            p1,
            p2
        )
    }

    pub async fn summarize(&self, args: &SummarizerArgs) -> Result<SummaryResult, EngineError> {
        let rate = self.effective_rate(args.override_compression_rate)?;
        info!(
            "Summarizing {} line(s), {} summary at rate {}",
            args.conversation_history.lines().count(),
            args.summary_type.as_str(),
            rate
        );

        let backup = self
            .bank
            .write(
                MemoryCategory::Archive,
                &format!("context-backup-{}.md", fs_safe_stamp()),
                &args.conversation_history,
            )
            .await?;
        debug!("Transcript backed up to {}", backup.display());

        let mut summary = self.render(&args.conversation_history, args.summary_type, rate);
        if let Some(provider) = &self.enhancer {
            match llm::enhance_summary(provider.as_ref(), &summary).await {
                Ok(enhanced) => {
                    debug!("Summary enhanced by {}", provider.name());
                    summary = enhanced;
                }
                Err(e) => warn!("Summary enhancement via {} failed, keeping original: {}", provider.name(), e),
            }
        }

        let daily = format!("session-summary-{}.md", Local::now().format("%Y-%m-%d"));
        self.bank
            .write(MemoryCategory::AutoGenerated, &daily, &summary)
            .await?;

        if let Some(output_file) = &args.output_file {
            let path = self.resolve(output_file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, &summary).await?;
            info!("Summary saved to {}", path.display());
        }

        Ok(SummaryResult { summary })
    }

    fn resolve(&self, output_file: &str) -> PathBuf {
        let path = Path::new(output_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }
}
