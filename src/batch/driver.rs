//! Resolve, generate and send for each posting with per-row isolation

use super::{RowResult, RowStatus};
use crate::config::Config;
use crate::error::{QuickApplyError, Result};
use crate::generation::ContentGenerator;
use crate::mail::{MailTransport, OutgoingMail};
use crate::models::{JobPosting, ResumeDocument};
use crate::resolver::email::normalize_recipient;
use crate::resolver::{RecruiterResolver, Strategy};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, warn};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Rows processed at once; results keep input order regardless
    pub concurrency: usize,
    /// Sender address on every email
    pub from: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            from: String::new(),
        }
    }
}

impl From<&Config> for BatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.batch.concurrency.max(1),
            from: config.sender_address().to_string(),
        }
    }
}

pub struct BatchDriver {
    resolver: Arc<RecruiterResolver>,
    generator: Arc<dyn ContentGenerator>,
    transport: Option<Arc<dyn MailTransport>>,
    options: BatchOptions,
    progress: ProgressBar,
}

impl BatchDriver {
    /// A driver without a transport only generates (dry run).
    pub fn new(resolver: Arc<RecruiterResolver>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            resolver,
            generator,
            transport: None,
            options: BatchOptions::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Show a terminal progress bar while the batch runs.
    pub fn with_progress_bar(mut self) -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template("{elapsed_precise} {bar:36.cyan/blue} {pos:>4}/{len:4} {msg}") {
            bar.set_style(style.progress_chars("■■□"));
        }
        self.progress = bar;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.transport.is_none()
    }

    /// Process every posting dated `date`; one result per posting, in order.
    pub async fn run(&self, postings: &[JobPosting], date: NaiveDate, resume: &ResumeDocument) -> Vec<RowResult> {
        let selected: Vec<&JobPosting> = postings.iter().filter(|p| p.date == date).collect();
        debug!("{} of {} postings are dated {}", selected.len(), postings.len(), date);

        self.progress.set_length(selected.len() as u64);
        self.progress.set_position(0);

        let results = stream::iter(selected)
            .map(|posting| async move {
                let result = AssertUnwindSafe(self.process_row(posting, resume, None))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        let message = panic_message(panic.as_ref());
                        error!("Row {} panicked: {}", posting.row_index, message);
                        RowResult::failed(posting, None, Strategy::None, message)
                    });

                self.progress.set_message(posting.serial_number.clone());
                self.progress.inc(1);
                result
            })
            .buffered(self.options.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        self.progress.finish_and_clear();
        results
    }

    /// Single posting; `recipient` replaces whatever the resolver would pick.
    pub async fn run_one(&self, posting: &JobPosting, resume: &ResumeDocument, recipient: Option<&str>) -> RowResult {
        AssertUnwindSafe(self.process_row(posting, resume, recipient))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| RowResult::failed(posting, None, Strategy::None, panic_message(panic.as_ref())))
    }

    async fn process_row(&self, posting: &JobPosting, resume: &ResumeDocument, recipient: Option<&str>) -> RowResult {
        let (email, strategy) = match recipient {
            Some(address) => (address.to_string(), Strategy::Lookup),
            None => {
                let resolution = self.resolver.resolve(posting).await;
                match resolution.email {
                    Some(email) => (email, resolution.strategy),
                    None => {
                        warn!("Skipping row {}: no recruiter email could be resolved", posting.row_index);
                        return RowResult::skipped(posting);
                    }
                }
            }
        };

        let to = normalize_recipient(&email);
        debug!("Row {} -> {} ({})", posting.row_index, to, strategy);

        let application = match self.generator.generate(posting, resume).await {
            Ok(application) => application,
            Err(e) => {
                warn!("Generation failed for row {}: {}", posting.row_index, e);
                return RowResult::failed(posting, Some(to), strategy, e.to_string());
            }
        };

        let Some(transport) = &self.transport else {
            return RowResult::new(posting, Some(to), strategy, RowStatus::Generated);
        };

        let mail = OutgoingMail::new(self.options.from.clone(), to.clone(), application.subject, application.body)
            .with_attachment(application.attachment);

        match transport.send(&mail).await {
            Ok(()) => RowResult::new(posting, Some(to), strategy, RowStatus::Sent),
            Err(e) => {
                warn!("Sending row {} failed: {}", posting.row_index, e);
                RowResult::failed(posting, Some(to), strategy, e.to_string())
            }
        }
    }
}

/// Checks that must pass before any row is attempted.
pub fn preflight(config: &Config, resume: &ResumeDocument, dry_run: bool) -> Result<()> {
    if resume.bytes.is_empty() {
        return Err(QuickApplyError::InvalidInput(format!(
            "Resume '{}' is empty",
            resume.file_name
        )));
    }
    if !dry_run {
        config.require_smtp_credentials()?;
    }
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panic: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panic: {}", message)
    } else {
        "panic while processing row".to_string()
    }
}
