use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use linkscrape::config::Config;
use linkscrape::email_validator::EmailValidator;
use linkscrape::extractor::{ContentExtractor, Finding};
use linkscrape::mailer::{
    unique_contacts, BulkMailer, FileAttachment, OutreachTemplate, SmtpMailTransport,
    ThrottlePolicy, TokioClock,
};
use linkscrape::server::{self, AppState};
use linkscrape::store::{ContactRecord, FileKeyValueStore, RecordStore};

#[derive(Parser)]
#[command(name = "linkscrape")]
#[command(about = "Extract contacts from saved LinkedIn pages and send outreach emails")]
#[command(version = "0.1.0")]
struct Args {
    /// Check the configuration and exit
    #[arg(long)]
    check_config: bool,

    /// Directory of the local record store (default: DATA_DIR or ./data)
    #[arg(short = 'o', long)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a saved page source ("-" reads stdin)
    Analyze {
        input: String,

        #[arg(short, long, value_enum, default_value_t = Mode::Posts)]
        mode: Mode,

        /// Only print what was found
        #[arg(long)]
        no_save: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored records
    List,
    /// Delete every record with this email
    Delete { email: String },
    /// Delete all stored records
    Clear,
    /// Write stored records to a CSV file
    Export { output: PathBuf },
    /// Email every stored contact once
    Send {
        /// Show recipients and subjects without sending
        #[arg(long)]
        dry_run: bool,
    },
    /// Serve POST /api/send-email
    Serve {
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Feed posts
    Posts,
    /// Job cards
    Jobs,
    /// Job cards and feed posts
    Mixed,
    /// Whole profile or job page
    Page,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    env_logger::init();

    let mut config = Config::new()?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    if args.check_config {
        print_config(&config);
        return Ok(());
    }

    let Some(command) = args.command else {
        anyhow::bail!("No command given. Run with --help to see the available commands");
    };

    match command {
        Command::Analyze {
            input,
            mode,
            no_save,
            json,
        } => run_analyze(&config, &input, mode, !no_save, json),
        Command::List => {
            let store = open_store(&config)?;
            println!("📁 {}", store.backend().dir().display());
            print_records(&store.stored_emails());
            Ok(())
        }
        Command::Delete { email } => {
            let mut store = open_store(&config)?;
            if !store.delete_email(&email) {
                anyhow::bail!("Unable to delete {}", email);
            }
            println!("🗑️  Deleted {}", email);
            Ok(())
        }
        Command::Clear => {
            let mut store = open_store(&config)?;
            if !store.clear_stored_emails() {
                anyhow::bail!("Unable to clear stored records");
            }
            println!("🗑️  All stored records deleted");
            Ok(())
        }
        Command::Export { output } => {
            let store = open_store(&config)?;
            let file = std::fs::File::create(&output)
                .with_context(|| format!("Unable to create {:?}", output))?;
            let count = store.export_csv(file)?;
            println!("💾 {} record(s) exported to {:?}", count, output);
            Ok(())
        }
        Command::Send { dry_run } => run_send(&config, dry_run).await,
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            let mailer = build_mailer(&config)?;
            server::start_server(&addr, AppState::new(mailer))
                .await
                .context("HTTP server stopped")
        }
    }
}

fn print_config(config: &Config) {
    println!("✅ Configuration valid!");
    println!("📁 Data directory: {}", config.data_dir);
    match &config.mail {
        Some(mail) => println!(
            "📧 SMTP: {}@{}:{}",
            mail.user, mail.smtp_host, mail.smtp_port
        ),
        None => println!("📧 SMTP: not configured (GMAIL_USER / GMAIL_APP_PASSWORD)"),
    }
    println!("📎 Attachment: {}", config.outreach.attachment_path);
    println!(
        "⏱️  Throttle: {} send(s) per {} ms",
        config.throttle.max_per_window, config.throttle.window_ms
    );
    println!("🌐 Server address: {}", config.server.addr);
}

fn open_store(config: &Config) -> Result<RecordStore<FileKeyValueStore>> {
    let backend = FileKeyValueStore::new(&config.data_dir)
        .with_context(|| format!("Unable to open data directory {}", config.data_dir))?;
    Ok(RecordStore::new(backend, EmailValidator::new()?))
}

fn build_template(config: &Config) -> Result<OutreachTemplate> {
    match &config.outreach.template_path {
        Some(path) => OutreachTemplate::from_file(config.outreach.subject.clone(), path),
        None => Ok(OutreachTemplate {
            subject: config.outreach.subject.clone(),
            ..OutreachTemplate::default()
        }),
    }
}

fn build_mailer(config: &Config) -> Result<BulkMailer> {
    let mail = config.require_mail()?;
    let transport = SmtpMailTransport::new(mail)?;
    let policy = ThrottlePolicy::new(config.throttle.max_per_window, config.throttle.window());
    let attachment = FileAttachment::new(&config.outreach.attachment_path);
    info!("📎 Attachment for every message: {}", attachment.path().display());

    Ok(
        BulkMailer::new(Arc::new(transport), Arc::new(attachment), mail.user.clone())
            .with_template(build_template(config)?)
            .with_throttle(policy, Arc::new(TokioClock)),
    )
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Unable to read stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Unable to read {}", input))
    }
}

fn run_analyze(config: &Config, input: &str, mode: Mode, save: bool, json: bool) -> Result<()> {
    let html = read_input(input)?;
    let extractor = ContentExtractor::new()?;

    let findings: Vec<Finding> = match mode {
        Mode::Posts => extractor.analyze(&html)?.into_iter().map(Finding::Post).collect(),
        Mode::Jobs => extractor.analyze_jobs(&html)?.into_iter().map(Finding::Job).collect(),
        Mode::Mixed => extractor.analyze_mixed(&html)?,
        Mode::Page => {
            let snapshot = extractor.scan_page(&html)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("📄 {}", snapshot.title.as_deref().unwrap_or("Untitled page"));
                println!("   Name: {}", snapshot.name.as_deref().unwrap_or("-"));
                println!("   Company: {}", snapshot.company.as_deref().unwrap_or("-"));
                println!("   Location: {}", snapshot.location.as_deref().unwrap_or("-"));
                println!("   Emails: {}", snapshot.emails.join(", "));
                println!("   Phones: {}", snapshot.phones.join(", "));
            }
            if save {
                let added = open_store(config)?.save_snapshot(&snapshot);
                info!("{} new email(s) stored from page", added);
                println!("💾 {} new email(s) stored", added);
            }
            return Ok(());
        }
    };

    if findings.is_empty() {
        println!("❌ No LinkedIn content found in the provided HTML");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else {
        for (index, finding) in findings.iter().enumerate() {
            print_finding(index + 1, finding);
        }
    }

    if save {
        let added = open_store(config)?.save_findings(&findings);
        println!("💾 {} new record(s) stored", added);
    }

    Ok(())
}

fn print_finding(number: usize, finding: &Finding) {
    match finding {
        Finding::Post(post) => {
            println!("📝 Post {} by {}", number, post.author.name);
            if let Some(title) = &post.author.title {
                println!("   {}", title);
            }
            if let Some(degree) = post.author.connection_degree {
                println!("   Connection: {}", degree);
            }
            let preview: String = post.content.chars().take(120).collect();
            println!("   {}", preview);
            println!(
                "   👍 {} reaction(s), 💬 {} comment(s)",
                post.reactions.count,
                post.comments.len()
            );
            println!("   📧 {}", post.emails.join(", "));
            println!("   📞 {}", post.phones.join(", "));
        }
        Finding::Job(job) => {
            println!("💼 Job {}: {}", number, job.title.as_deref().unwrap_or("Unknown"));
            println!(
                "   {} - {}",
                job.company.as_deref().unwrap_or("-"),
                job.location.as_deref().unwrap_or("-")
            );
            if let Some(posted) = &job.posted_date {
                println!("   Posted: {}", posted);
            }
            println!("   📧 {}", job.emails.join(", "));
            println!("   📞 {}", job.phones.join(", "));
        }
    }
    println!();
}

fn print_records(records: &[ContactRecord]) {
    if records.is_empty() {
        println!("No stored records");
        return;
    }

    println!("{}", "=".repeat(80));
    for record in records {
        println!(
            "{} | {} | {} | {}",
            record.email.as_deref().unwrap_or("-"),
            if record.author_name.is_empty() { "-" } else { record.author_name.as_str() },
            record.captured_at.format("%Y-%m-%d"),
            record.source
        );
    }
    println!("{}", "=".repeat(80));
    println!("📊 {} record(s)", records.len());
}

async fn run_send(config: &Config, dry_run: bool) -> Result<()> {
    let store = open_store(config)?;
    let contacts = store.stored_posts();

    if dry_run {
        let template = build_template(config)?;
        let recipients = unique_contacts(&contacts);

        println!("\n{}", "=".repeat(80));
        println!("🧪 DRY-RUN - {} recipient(s)", recipients.len());
        println!("{}", "=".repeat(80));
        for contact in recipients {
            let (subject, _) = template.render(contact);
            println!(
                "📧 {} - {}",
                contact.email.as_deref().unwrap_or_default(),
                subject
            );
        }
        return Ok(());
    }

    let mailer = build_mailer(config)?;
    match mailer.send_bulk(&contacts).await {
        Ok(batch) => {
            info!(
                "✅ Batch completed: {} sent, {} failed",
                batch.total_sent, batch.total_failed
            );
            for result in batch.results.iter().filter(|r| r.error.is_some()) {
                println!(
                    "❌ {}: {}",
                    result.email,
                    result.error.as_deref().unwrap_or_default()
                );
            }
            println!(
                "📊 {} sent, {} failed",
                batch.total_sent, batch.total_failed
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ Batch aborted before sending: {}", e);
            Err(e.into())
        }
    }
}
