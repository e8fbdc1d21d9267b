//! quick-apply: send tailored job applications from a job sheet

use clap::Parser;
use colored::Colorize;
use log::{error, info, warn};
use quick_apply::batch::driver::preflight;
use quick_apply::batch::{write_log, BatchDriver, BatchOptions, RowStatus};
use quick_apply::cli::{self, Cli, Commands, ConfigAction, GenerationArgs};
use quick_apply::config::Config;
use quick_apply::error::{QuickApplyError, Result};
use quick_apply::generation::{build_application, AttachmentMode, ContentGenerator, LlmGenerator, TemplateGenerator};
use quick_apply::input::{load_contacts, InputManager, JobSheet};
use quick_apply::llm::OpenAiCompatClient;
use quick_apply::mail::SmtpMailer;
use quick_apply::models::{JobPosting, ResumeDocument};
use quick_apply::output::{save_report_to_file, BatchReport, OutputFormat, ReportGenerator, ReportMetadata};
use quick_apply::processing::TextProcessor;
use quick_apply::resolver::domain::{LlmDomainInference, SearchDomainInference};
use quick_apply::resolver::email::normalize_recipient;
use quick_apply::resolver::{RecruiterResolver, ResolverOptions};
use std::path::Path;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Batch {
            jobs,
            resume,
            date,
            contacts,
            generation,
            dry_run,
            concurrency,
            output,
            save,
        } => {
            let format: OutputFormat = output.parse()?;
            let resume_doc = load_resume(&resume).await?;
            preflight(&config, &resume_doc, dry_run)?;

            let sheet = JobSheet::load(&jobs)?;
            info!("Loaded {} postings from {}", sheet.len(), jobs.display());

            let resolver = build_resolver(&config, &sheet, contacts.as_deref())?;
            let generator = build_generator(&config, &generation)?;

            let mut options = BatchOptions::from(&config);
            if let Some(n) = concurrency {
                options.concurrency = n.max(1);
            }

            let mut driver = BatchDriver::new(Arc::new(resolver), generator.clone())
                .with_options(options)
                .with_progress_bar();
            if !dry_run {
                driver = driver.with_transport(Arc::new(SmtpMailer::from_config(&config.smtp)?));
            }

            let results = driver.run(sheet.postings(), date, &resume_doc).await;
            if results.is_empty() {
                warn!("No postings dated {} in {}", date, jobs.display());
            }

            let log_file = write_log(&config.batch.log_dir, date, &results)?;

            let report = BatchReport::new(
                results,
                ReportMetadata {
                    generated_at: chrono::Utc::now(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    date,
                    jobs_file: jobs.to_string_lossy().to_string(),
                    resume_file: resume.to_string_lossy().to_string(),
                    generator: generator.name().to_string(),
                    dry_run,
                    log_file: Some(log_file.to_string_lossy().to_string()),
                },
            );

            println!("{}", ReportGenerator::new().generate_report(&report, format)?);

            if let Some(path) = save {
                let content = ReportGenerator::with_colors(false).generate_report(&report, format)?;
                save_report_to_file(content.as_bytes(), &path)?;
                println!("Report saved to {}", path.display());
            }
        }

        Commands::Apply {
            jobs,
            resume,
            company,
            row,
            date,
            to,
            contacts,
            generation,
            dry_run,
        } => {
            let resume_doc = load_resume(&resume).await?;
            preflight(&config, &resume_doc, dry_run)?;

            let sheet = JobSheet::load(&jobs)?;
            let posting = select_posting(&sheet, &company, row, date)?;

            let resolver = build_resolver(&config, &sheet, contacts.as_deref())?;
            let generator = build_generator(&config, &generation)?;

            let mut driver = BatchDriver::new(Arc::new(resolver), generator).with_options(BatchOptions::from(&config));
            if !dry_run {
                driver = driver.with_transport(Arc::new(SmtpMailer::from_config(&config.smtp)?));
            }

            let result = driver.run_one(&posting, &resume_doc, to.as_deref()).await;
            let recipient = result.recipient.as_deref().unwrap_or("-");

            match result.status {
                RowStatus::Sent => println!("{} {} ({})", "Sent to".green().bold(), recipient, result.strategy),
                RowStatus::Generated => println!("{} {} ({})", "Dry run, would send to".cyan(), recipient, result.strategy),
                RowStatus::Skipped => println!("{}", "No recruiter email could be resolved; nothing sent".yellow()),
                RowStatus::Error => {
                    return Err(QuickApplyError::ApplicationFailed(
                        result.error.unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
            }
        }

        Commands::Preview {
            jobs,
            resume,
            company,
            row,
            date,
            generation,
            save,
        } => {
            let resume_doc = load_resume(&resume).await?;
            let sheet = JobSheet::load(&jobs)?;
            let posting = select_posting(&sheet, &company, row, date)?;

            let resolver = build_resolver(&config, &sheet, None)?;
            let generator = build_generator(&config, &generation)?;

            let resolution = resolver.resolve(&posting).await;
            let draft = generator.draft(&posting, &resume_doc).await?;

            let processor = TextProcessor::new();
            let before = processor.ats_score(&posting.job_description, &resume_doc.text);
            let after = processor.ats_score(&posting.job_description, &draft.resume_text);
            let keywords = processor.top_keywords(&posting.job_description, 10);
            let coverage = processor.keyword_coverage(&keywords, &resume_doc.text)?;

            println!("{}", format!("Preview for {} (#{})", posting.company_name, posting.serial_number).blue().bold());
            match &resolution.email {
                Some(email) => println!("To: {} ({})", normalize_recipient(email), resolution.strategy),
                None => println!("To: {}", "unresolved".yellow()),
            }
            println!("Subject: {}\n", draft.subject);
            println!("{}\n", draft.body);
            println!("ATS score: {}% (original) -> {}% (tailored)", before, after);
            if !coverage.matched.is_empty() {
                println!("Keywords found: {}", coverage.matched.join(", ").green());
            }
            if !coverage.missing.is_empty() {
                println!("Keywords missing: {}", coverage.missing.join(", ").yellow());
            }

            if let Some(path) = save {
                let application = build_application(draft, &posting, &resume_doc, generator.attachment_mode())?;
                save_report_to_file(&application.attachment.bytes, &path)?;
                println!("Attachment saved to {}", path.display());
            }
        }

        Commands::Resolve {
            jobs,
            date,
            contacts,
            all,
        } => {
            let sheet = JobSheet::load(&jobs)?;
            let resolver = build_resolver(&config, &sheet, contacts.as_deref())?;

            let postings: Vec<JobPosting> = match date {
                Some(date) => sheet.for_date(date),
                None => sheet.postings().to_vec(),
            };

            for posting in &postings {
                let result = resolver.resolve(posting).await;
                let email = result.email.as_deref().unwrap_or("-");
                println!(
                    "#{:<5} {:<30} {:<40} {}",
                    posting.serial_number, posting.company_name, email, result.strategy
                );
                if all {
                    for candidate in result.candidates.iter().skip(1) {
                        println!("       {:<30} {}", "", candidate.dimmed());
                    }
                }
            }
        }

        Commands::Companies { jobs, date } => {
            let sheet = JobSheet::load(&jobs)?;
            for company in sheet.companies(date) {
                println!("{}", company);
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let shown = toml::to_string_pretty(&config.redacted())
                    .map_err(|e| QuickApplyError::Configuration(e.to_string()))?;
                println!("# {}\n{}", config_path.display(), shown);
            }

            Some(ConfigAction::Path) => println!("{}", config_path.display()),

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset to defaults");
            }

            Some(ConfigAction::Set { key, value }) => {
                let mut file_config = Config::read_from(config_path)?;
                file_config.set_value(&key, &value)?;
                file_config.save_to(config_path)?;
                println!("Set {}", key);
            }
        },
    }

    Ok(())
}

async fn load_resume(path: &Path) -> Result<ResumeDocument> {
    cli::validate_file_extension(path, &["pdf", "txt", "md"])
        .map_err(|e| QuickApplyError::InvalidInput(format!("Resume file: {}", e)))?;

    let resume = InputManager::new().load_resume(path).await?;
    if resume.text.trim().is_empty() {
        warn!("No text could be read from {}; generated content will be generic", path.display());
    }
    Ok(resume)
}

fn build_resolver(config: &Config, sheet: &JobSheet, contacts: Option<&Path>) -> Result<RecruiterResolver> {
    let mut reference = sheet.reference_table();
    if let Some(path) = contacts {
        let extra = load_contacts(path)?;
        info!("Loaded {} contacts from {}", extra.len(), path.display());
        reference.extend(extra);
    }

    let mut resolver = RecruiterResolver::new(ResolverOptions::from(&config.resolution)).with_reference(reference);

    if config.llm.domain_inference {
        let client = OpenAiCompatClient::new(&config.llm)?;
        resolver = resolver.with_domain_source(Arc::new(LlmDomainInference::new(Arc::new(client))));
    }
    if let Some(search) = SearchDomainInference::from_config(&config.resolution)? {
        resolver = resolver.with_domain_source(Arc::new(search));
    }

    Ok(resolver)
}

fn build_generator(config: &Config, args: &GenerationArgs) -> Result<Arc<dyn ContentGenerator>> {
    let mode = AttachmentMode::from_flag(args.attach_original || config.batch.attach_original);
    let template = TemplateGenerator::new(config.applicant.clone()).with_attachment_mode(mode);

    if args.llm || config.llm.enabled {
        let client = OpenAiCompatClient::new(&config.llm)?;
        info!("Generating with {} at {}", config.llm.model, config.llm.base_url);
        Ok(Arc::new(
            LlmGenerator::new(Arc::new(client), template).with_temperature(config.llm.temperature),
        ))
    } else {
        Ok(Arc::new(template))
    }
}

fn select_posting(sheet: &JobSheet, company: &str, row: Option<usize>, date: Option<chrono::NaiveDate>) -> Result<JobPosting> {
    let mut matches = sheet.for_company(company, date);
    if matches.is_empty() {
        return Err(QuickApplyError::InvalidInput(format!("No posting found for company '{}'", company)));
    }

    let index = match row {
        Some(0) => {
            return Err(QuickApplyError::InvalidInput("--row is 1-based".to_string()));
        }
        Some(n) if n > matches.len() => {
            return Err(QuickApplyError::InvalidInput(format!(
                "'{}' has {} postings; --row {} is out of range",
                company,
                matches.len(),
                n
            )));
        }
        Some(n) => n - 1,
        None => {
            if matches.len() > 1 {
                warn!("'{}' has {} postings; using the first (pick one with --row)", company, matches.len());
            }
            0
        }
    };

    Ok(matches.swap_remove(index))
}
