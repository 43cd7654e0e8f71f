//! System prompt construction
//!
//! The prompt is injected in front of the history on every reasoning call
//! and never stored in the conversation state.

use crate::tools::ToolKind;

/// Profile the recruiter is hiring for when none is configured
pub const DEFAULT_JOB_PROFILE: &str = "um programador com base sólida em LLMs e Python";

/// Build the recruiter prompt for the given job profile.
pub fn build_system_prompt(job_profile: &str) -> String {
    let profile = match job_profile.trim() {
        "" => DEFAULT_JOB_PROFILE,
        p => p,
    };
    let loader = ToolKind::LoadResumes.name();

    format!(
        "Você é um especialista em análise de currículos e um assistente de recrutamento. \
         Seu trabalho é analisar os currículos fornecidos, um por um. \
         Estamos em busca de {profile}. \
         Para cada currículo, forneça uma análise detalhada, incluindo:\n\
         1. Pontos Fortes (ligados ao perfil da vaga).\n\
         2. Pontos Fracos/Áreas de Oportunidade.\n\
         3. Recomendação de Contratação (Sim/Não/Talvez).\n\
         Use a ferramenta '{loader}' apenas se a última mensagem do usuário indicar \
         que é hora de carregar/analisar os dados."
    )
}
