use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand, ValueEnum};
use metrics_exporter_prometheus::PrometheusHandle;
use rh_reporting::assistant::{ChatReply, ConversationHistory, Responder, GREETING};
use rh_reporting::config::AppConfig;
use rh_reporting::error::AppError;
use rh_reporting::reporting::charts::{ChartArtifact, ChartRenderer};
use rh_reporting::reporting::repository::{KpiRepository, LoadFailure};
use rh_reporting::reporting::summary::views::{format_quantity, AggregateSummaryView};
use rh_reporting::reporting::summary::AggregateSummary;
use rh_reporting::telemetry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
struct AppState {
    repository: Arc<KpiRepository>,
    renderer: Arc<ChartRenderer>,
    history: Arc<Mutex<ConversationHistory>>,
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Assistant RH Reporting",
    about = "Consult the quarterly recruitment KPIs from a chat, the command line, or HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Chat with the reporting assistant on the terminal
    Chat(ChatArgs),
    /// Print the aggregate quarterly report
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct ChatArgs {
    /// Answer a single question and exit instead of starting the loop
    #[arg(long)]
    message: Option<String>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Output format for the report
    #[arg(long, value_enum, default_value = "human")]
    format: ReportFormat,
    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Human,
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<ChartArtifact>,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    summary: AggregateSummaryView,
    load_failures: Vec<LoadFailure>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Chat(args) => run_chat(args),
        Command::Report(args) => run_report(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let repository = Arc::new(KpiRepository::load(&config.reporting));
    let renderer = Arc::new(ChartRenderer::new(config.reporting.charts_dir.clone()));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        repository,
        renderer,
        history: Arc::new(Mutex::new(ConversationHistory::new())),
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/chat", post(chat_endpoint))
        .route("/api/v1/report", get(report_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recruitment reporting assistant ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_chat(args: ChatArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let repository = KpiRepository::load(&config.reporting);
    for failure in repository.failures() {
        println!(
            "Erreur lors du chargement des données pour {}: {}",
            failure.recruiter, failure.reason
        );
    }

    let renderer = ChartRenderer::new(config.reporting.charts_dir.clone());
    let responder = Responder::new(&repository, &renderer);

    if let Some(message) = args.message {
        print_reply(&responder.respond(&message));
        return Ok(());
    }

    let mut history = ConversationHistory::new();
    println!("{GREETING}");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "quit" | "exit" | "q") {
            break;
        }

        let reply = responder.respond(question);
        history.push_user(question);
        history.push_assistant(reply.message.clone());
        print_reply(&reply);
    }

    Ok(())
}

fn print_reply(reply: &ChatReply) {
    println!("{}", reply.message);
    if let Some(chart) = &reply.chart {
        println!("Graphique enregistré: {}", chart.path.display());
    }
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let repository = KpiRepository::load(&config.reporting);
    let summary = AggregateSummary::compute(&repository);

    let rendered = match args.format {
        ReportFormat::Human => render_human_report(&summary, repository.failures()),
        ReportFormat::Json => {
            let response = ReportResponse {
                summary: summary.view(),
                load_failures: repository.failures().to_vec(),
            };
            let mut body = serde_json::to_string_pretty(&response)?;
            body.push('\n');
            body
        }
        ReportFormat::Csv => render_csv_report(&summary)?,
    };

    match args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }

    Ok(())
}

fn render_human_report(summary: &AggregateSummary, failures: &[LoadFailure]) -> String {
    let mut out = String::new();

    out.push_str("Reporting recrutement Q3 2024\n\n");

    out.push_str("Totaux globaux\n");
    out.push_str(&format!(
        "- Candidats contactés: {}\n",
        format_quantity(summary.contacted)
    ));
    out.push_str(&format!(
        "- Entretiens totaux: {} (salariés: {}, sous-traitants: {})\n",
        format_quantity(summary.interviews),
        format_quantity(summary.salaried_interviews),
        format_quantity(summary.subcontractor_interviews)
    ));
    out.push_str(&format!(
        "- Recrutements aboutis: {}\n",
        format_quantity(summary.recruitments)
    ));

    out.push_str("\nPar recruteur\n");
    for (name, highlights) in &summary.recruiters {
        out.push_str(&format!(
            "- {}: {} contactés, {} entretiens salariés, {} entretiens sous-traitants, {} recrutements\n",
            name,
            format_quantity(highlights.contacted),
            format_quantity(highlights.salaried_interviews),
            format_quantity(highlights.subcontractor_interviews),
            format_quantity(highlights.recruitments)
        ));
    }

    out.push_str("\nMeilleurs recruteurs\n");
    match &summary.best_contact {
        Some(best) => out.push_str(&format!(
            "- Contact: {} ({} candidats)\n",
            best.name,
            format_quantity(best.value)
        )),
        None => out.push_str("- Contact: aucun recruteur ne se détache\n"),
    }
    match &summary.best_recruitment {
        Some(best) => out.push_str(&format!(
            "- Recrutements: {} ({} recrutements)\n",
            best.name,
            format_quantity(best.value)
        )),
        None => out.push_str("- Recrutements: aucun recruteur ne se détache\n"),
    }

    if !failures.is_empty() {
        out.push_str("\nDonnées indisponibles\n");
        for failure in failures {
            out.push_str(&format!("- {}: {}\n", failure.recruiter, failure.reason));
        }
    }

    out
}

fn render_csv_report(summary: &AggregateSummary) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "Recruteur",
        "Candidats contactés",
        "Entretiens Salariés",
        "Entretiens Sous-Traitants",
        "Recrutements",
    ])?;

    for (name, highlights) in &summary.recruiters {
        writer.write_record(&[
            name.clone(),
            format_quantity(highlights.contacted),
            format_quantity(highlights.salaried_interviews),
            format_quantity(highlights.subcontractor_interviews),
            format_quantity(highlights.recruitments),
        ])?;
    }

    writer.write_record(&[
        "Total".to_owned(),
        format_quantity(summary.contacted),
        format_quantity(summary.salaried_interviews),
        format_quantity(summary.subcontractor_interviews),
        format_quantity(summary.recruitments),
    ])?;

    let bytes = writer
        .into_inner()
        .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::Other, err.to_string())))?;
    String::from_utf8(bytes)
        .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn chat_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let responder = Responder::new(&state.repository, &state.renderer);
    let reply = responder.respond(&payload.message);

    let mut history = match state.history.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    history.push_user(payload.message.as_str());
    history.push_assistant(reply.message.clone());

    Json(ChatResponse {
        reply: reply.message,
        chart: reply.chart,
    })
}

async fn report_endpoint(State(state): State<AppState>) -> Json<ReportResponse> {
    let summary = AggregateSummary::compute(&state.repository);
    Json(ReportResponse {
        summary: summary.view(),
        load_failures: state.repository.failures().to_vec(),
    })
}
