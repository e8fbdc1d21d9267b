//! End-to-end batch runs over the fixture job sheet with an in-memory transport

use async_trait::async_trait;
use chrono::NaiveDate;
use quick_apply::batch::{read_log, write_log, BatchDriver, BatchOptions, RowStatus};
use quick_apply::config::ApplicantConfig;
use quick_apply::generation::{ContentGenerator, TemplateGenerator};
use quick_apply::input::{InputManager, JobSheet};
use quick_apply::mail::{MailError, MailTransport, OutgoingMail};
use quick_apply::models::ResumeDocument;
use quick_apply::resolver::{RecruiterResolver, ResolverOptions, Strategy};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct MemoryTransport {
    delivered: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if mail.to.starts_with("careers@") {
            return Err(MailError::Transport("550 5.1.1 mailbox unavailable".to_string()));
        }
        self.delivered.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

async fn resume() -> ResumeDocument {
    InputManager::new()
        .load_resume(Path::new("tests/fixtures/sample_resume.txt"))
        .await
        .unwrap()
}

fn setup() -> (JobSheet, Arc<RecruiterResolver>, Arc<dyn ContentGenerator>) {
    let sheet = JobSheet::load(Path::new("tests/fixtures/jobs.csv")).unwrap();
    let resolver = RecruiterResolver::new(ResolverOptions::default()).with_reference(sheet.reference_table());
    let generator = TemplateGenerator::new(ApplicantConfig {
        name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone: String::new(),
    });
    (sheet, Arc::new(resolver), Arc::new(generator))
}

#[tokio::test]
async fn test_batch_reports_every_row_in_order() {
    let (sheet, resolver, generator) = setup();
    let transport = Arc::new(MemoryTransport::default());
    let driver = BatchDriver::new(resolver, generator)
        .with_transport(transport.clone())
        .with_options(BatchOptions {
            concurrency: 3,
            from: "john.doe@example.com".to_string(),
        });

    let results = driver.run(sheet.postings(), day(), &resume().await).await;

    let summary: Vec<(usize, RowStatus, Strategy)> =
        results.iter().map(|r| (r.row_index, r.status, r.strategy)).collect();
    assert_eq!(
        summary,
        vec![
            (0, RowStatus::Sent, Strategy::Lookup),
            (1, RowStatus::Error, Strategy::Scrape),
            (2, RowStatus::Sent, Strategy::FuzzyMatch),
            (3, RowStatus::Sent, Strategy::Lookup),
            (4, RowStatus::Skipped, Strategy::None),
        ]
    );

    assert!(results[1].error.as_deref().unwrap().contains("550"));
    assert_eq!(results[2].recipient.as_deref(), Some("bill.lumbergh@initech.com"));

    let delivered = transport.delivered.lock().unwrap();
    let recipients: Vec<&str> = delivered.iter().map(|m| m.to.as_str()).collect();
    assert_eq!(recipients.len(), 3);
    assert!(recipients.contains(&"x@gmail.com"));
    assert!(!recipients.iter().any(|r| r.contains("gamil")));

    let acme = delivered.iter().find(|m| m.to == "jane.doe@acme.com").unwrap();
    assert_eq!(acme.subject, "Application for role - Acme Robotics");
    assert!(acme.body.starts_with("Dear Jane,"));
    let attachment = acme.attachment.as_ref().unwrap();
    assert_eq!(attachment.file_name, "resume_Acme_Robotics.pdf");
    assert!(attachment.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_dry_run_writes_log() {
    let (sheet, resolver, generator) = setup();
    let driver = BatchDriver::new(resolver, generator);

    let results = driver.run(sheet.postings(), day(), &resume().await).await;
    assert_eq!(results.len(), 5);
    assert_eq!(results.iter().filter(|r| r.status == RowStatus::Generated).count(), 4);

    let dir = TempDir::new().unwrap();
    let path = write_log(&dir.path().join("agent_apply_logs"), day(), &results).unwrap();
    assert!(path.ends_with("agent_apply_logs/apply_log_2024-05-01.csv"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains("Acme Robotics"), "company names are not logged");
    assert_eq!(read_log(&path).unwrap(), results);
}

#[tokio::test]
async fn test_other_dates_are_untouched() {
    let (sheet, resolver, generator) = setup();
    let transport = Arc::new(MemoryTransport::default());
    let driver = BatchDriver::new(resolver, generator).with_transport(transport.clone());

    let next_day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let results = driver.run(sheet.postings(), next_day, &resume().await).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].row_index, 5);
    assert_eq!(transport.delivered.lock().unwrap()[0].to, "bill.lumbergh@initech.com");

    let empty_day = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    assert!(driver.run(sheet.postings(), empty_day, &resume().await).await.is_empty());
}
