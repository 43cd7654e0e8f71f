//! Command-line and environment configuration
//!
//! Every option can be given as a flag or through the environment; `main`
//! loads a `.env` file before parsing so both work the same way.

use crate::llm::DEFAULT_BASE_URL;
use crate::runtime::DEFAULT_MAX_ITERATIONS;
use crate::system_prompt::DEFAULT_JOB_PROFILE;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_RESUME_FOLDER: &str = "curriculos";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Parser)]
#[command(name = "resume_analyst")]
#[command(about = "Conversational resume analyst backed by an OpenAI-compatible model")]
#[command(version)]
pub struct Cli {
    /// API key for the reasoning service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API
    #[arg(long, env = "LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Model id sent with every request
    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature
    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Folder the loader reads when the model doesn't name one
    #[arg(long, env = "RESUME_FOLDER", default_value = DEFAULT_RESUME_FOLDER)]
    pub resume_folder: PathBuf,

    /// Profile the resumes are evaluated against
    #[arg(long, env = "JOB_PROFILE", default_value = DEFAULT_JOB_PROFILE)]
    pub job_profile: String,

    /// Reasoning steps allowed per turn
    #[arg(long, env = "MAX_TURN_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Timeout for each reasoning call, in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Print the agent graph as Mermaid and exit
    #[arg(long)]
    pub print_graph: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("GROQ_API_KEY is not set (use --api-key, the environment, or a .env file)")]
    MissingApiKey,
    #[error("temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),
}

/// Validated settings the agent is built from
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub resume_folder: PathBuf,
    pub job_profile: String,
    pub max_iterations: usize,
    pub timeout: Duration,
}

impl TryFrom<Cli> for AgentConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let api_key = cli
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        if !(0.0..=2.0).contains(&cli.temperature) {
            return Err(ConfigError::InvalidTemperature(cli.temperature));
        }

        Ok(Self {
            api_key,
            base_url: cli.base_url,
            model: cli.model,
            temperature: cli.temperature,
            resume_folder: cli.resume_folder,
            job_profile: cli.job_profile,
            max_iterations: cli.max_iterations,
            timeout: Duration::from_secs(cli.timeout_secs),
        })
    }
}
