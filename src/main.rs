use clap::Parser;
use log::{error, info};
use pdfchat::core::clock::SystemClock;
use pdfchat::core::config::{self, ResolvedConfig};
use pdfchat::core::observer::LogObserver;
use pdfchat::core::state::Session;
use pdfchat::transport::{ChatTransport, HttpChatTransport};
use pdfchat::tui::{self, Exit};
use pdfchat::upload::{DocumentDescriptor, UploadClient, UploadProgress};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pdfchat", about = "Upload a PDF and chat about it")]
struct Args {
    /// PDF to upload. Prompted for if omitted.
    pdf: Option<PathBuf>,

    /// Backend base URL (overrides config file and PDFCHAT_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,
}

fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

/// Asks for a PDF path on stdin. `None` on EOF or an empty answer.
fn prompt_for_pdf() -> io::Result<Option<PathBuf>> {
    print!("Path to a PDF (empty to quit): ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim();
    Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
}

async fn upload_with_progress(
    uploader: &UploadClient,
    path: &Path,
) -> Result<DocumentDescriptor, pdfchat::upload::UploadError> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<UploadProgress>();
    let printer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            eprint!("\rUploading... {:>3}%", progress.percent());
        }
        eprintln!();
    });
    let result = uploader.upload(path, Some(tx)).await;
    let _ = printer.await;
    result
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Ignoring config file: {e}");
        config::PdfChatConfig::default()
    });
    let config = config::resolve(&file_config, args.backend_url.as_deref());
    init_logging(&config);
    info!("pdfchat starting up with backend {}", config.backend_url);

    let transport: Arc<dyn ChatTransport> = Arc::new(
        HttpChatTransport::new(config.backend_url.clone(), config.request_timeout)
            .map_err(io::Error::other)?,
    );
    let uploader = UploadClient::new(
        config.backend_url.clone(),
        config.max_upload_bytes,
        config.request_timeout,
    )
    .map_err(io::Error::other)?;

    let mut next_path = args.pdf;
    loop {
        let path = match next_path.take() {
            Some(path) => path,
            None => match prompt_for_pdf()? {
                Some(path) => path,
                None => break,
            },
        };

        let descriptor = match upload_with_progress(&uploader, &path).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                error!("Upload of {} failed: {}", path.display(), e);
                eprintln!("Failed to upload file: {e}");
                continue;
            }
        };

        let pdf_bytes = match descriptor.pdf_bytes() {
            Ok(bytes) => Some(bytes.len()),
            Err(e) => {
                error!("PDF payload for {} did not decode: {}", descriptor.file_name, e);
                None
            }
        };

        let mut session = Session::new(descriptor.document_ref(), Arc::new(SystemClock));
        session.subscribe(Arc::new(LogObserver));

        match tui::run(session, transport.clone(), pdf_bytes)? {
            Exit::Quit => break,
            Exit::NewDocument => continue,
        }
    }

    info!("pdfchat shutting down");
    Ok(())
}
