//! Resume Analyst - conversational recruiter assistant
//!
//! A read/print loop over a reason/tool graph: the model answers directly or
//! asks to load the resume PDFs, then analyzes them.

mod config;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;
mod tools;

use clap::Parser;
use config::{AgentConfig, Cli};
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::{
    run_turn, CompiledGraph, GraphBuilder, ReasoningSettings, ServiceLlmClient,
    ToolRegistryExecutor,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tools::{ToolContext, ToolRegistry};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type AgentGraph = CompiledGraph<ServiceLlmClient, ToolRegistryExecutor>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real env vars and flags still apply
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();
    init_tracing(cli.log_json);

    if cli.print_graph {
        // Rendering never calls the model, so no key is needed
        cli.api_key.get_or_insert_with(|| "unused".to_string());
        let graph = build_graph(&AgentConfig::try_from(cli)?)?;
        print!("{}", graph.to_mermaid());
        return Ok(());
    }

    let config = AgentConfig::try_from(cli)?;
    let graph = build_graph(&config)?;
    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        folder = %config.resume_folder.display(),
        max_iterations = graph.max_iterations(),
        "Agent ready"
    );

    println!("✅ Agente de Análise de Currículos Iniciado.");
    println!("📁 Pasta de Curriculos: {}", config.resume_folder.display());
    println!("Digite 'q' ou 'sair' para encerrar.");
    println!("---");

    repl(&graph).await?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "resume_analyst=warn".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_graph(config: &AgentConfig) -> Result<AgentGraph, Box<dyn std::error::Error>> {
    let service = OpenAIService::new(
        config.api_key.as_str(),
        config.model.as_str(),
        &config.base_url,
        config.timeout,
    )?;
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(service)));
    let llm = ServiceLlmClient::new(service);

    let registry = ToolRegistry::standard(ToolContext::new(&config.resume_folder));
    let tools = ToolRegistryExecutor::new(registry);

    let settings = ReasoningSettings::new(system_prompt::build_system_prompt(&config.job_profile))
        .with_temperature(config.temperature);

    let graph = GraphBuilder::standard(llm, tools, settings)
        .max_iterations(config.max_iterations)
        .compile()?;
    Ok(graph)
}

fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("sair")
}

async fn repl(graph: &AgentGraph) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n👤 Você: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if is_exit_command(&line) {
            println!("Até mais!");
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match run_turn(graph, input).await {
            Ok(state) => {
                println!("{}", "-".repeat(20));
                println!("🤖 AI: {}", state.final_text().unwrap_or_default());
            }
            Err(e) => {
                println!("{}", "-".repeat(20));
                eprintln!("⚠️ Erro ao processar a mensagem: {e}");
            }
        }
    }

    Ok(())
}
