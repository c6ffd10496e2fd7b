mod config;
mod error;
mod ollama;
mod orchestrator;
mod planner;
mod tools;
mod trello;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use ollama::{ChatMessage, OllamaClient};
use orchestrator::Orchestrator;
use planner::OllamaPlanner;
use tools::standard_toolbox;
use trello::TrelloClient;

/// Cria cards no Trello a partir de um pedido em linguagem natural.
#[derive(Parser, Debug)]
#[command(name = "tarefa", version, about)]
struct Cli {
    /// O pedido, em linguagem natural (ex.: "gere um sistema de
    /// autenticação JWT em FastAPI com prazo amanhã 18:00")
    request: String,

    /// URL ou shortlink do board (padrão: config.toml)
    #[arg(long)]
    board: Option<String>,

    /// Nome da lista no board (padrão: config.toml)
    #[arg(long)]
    list: Option<String>,

    /// Prazo em linguagem natural (ex.: "amanhã 18:00-03:00")
    #[arg(long)]
    due: Option<String>,

    /// Modelo Ollama a usar
    #[arg(long)]
    model: Option<String>,

    /// Temperatura do modelo
    #[arg(long)]
    temperature: Option<f32>,

    /// Loga cada passo do agente
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    pretty_env_logger::formatted_builder()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Load configuration
    let mut config = Config::load("config.toml")?;
    if let Some(model) = cli.model {
        config.planner.model = model;
    }
    if let Some(temperature) = cli.temperature {
        config.planner.temperature = temperature;
    }
    log::info!("Configuration loaded (model: {})", config.planner.model);

    // Credentials are required before any session starts
    let credentials = config.trello.credentials()?;

    // Assemble the toolbox and the planner
    let trello = TrelloClient::new(credentials)?;
    let toolbox = standard_toolbox(trello, config.trello.defaults());
    let client = OllamaClient::new(config.planner.endpoint.clone(), config.planner.model.clone())?;
    let planner = OllamaPlanner::new(client, config.planner.temperature);
    let orchestrator = Orchestrator::new(Box::new(planner), toolbox);

    // Run one session: system framing + the user's request
    let history = vec![
        ChatMessage::system(system_prompt(&config)),
        ChatMessage::user(user_prompt(&cli.request, &cli.board, &cli.list, &cli.due)),
    ];

    let answer = orchestrator
        .run(history)
        .await
        .context("Session terminated with an unrecovered error")?;

    println!("{}", answer);
    Ok(())
}

/// Productivity-agent framing handed to the planner, including the
/// configured defaults so it never has to ask for them.
fn system_prompt(config: &Config) -> String {
    let board = config.trello.default_board.as_deref().unwrap_or("(nenhum)");
    let list = config.trello.default_list.as_deref().unwrap_or("(nenhuma)");

    format!(
        "Você é um agente de produtividade. NÃO peça key/token; já estão configurados. \
        Se o usuário não informar board/lista, use o board {} e a lista '{}'. \
        Fluxo: \
        1) Gere um TÍTULO curto do card. \
        2) Redija uma DESCRIÇÃO TÉCNICA estruturada (bullets), com entregáveis, critérios de aceite e notas de segurança. \
        3) Monte 1-3 CHECKLISTS com 4-10 itens cada, práticos e verificáveis. \
        4) Se houver data/hora natural, converta com 'to_rfc3339' e use como 'due'; se não houver, crie sem due. \
        5) Resolva o 'idList' com 'resolve_list_id' (board URL/shortlink + nome da lista, ou padrões). \
        6) Crie o card chamando 'trello_create_card' já com a descrição. \
        7) Crie os checklists com 'trello_add_checklist'. \
        Retorne no final SOMENTE a URL do card.",
        board, list
    )
}

/// The free-text request plus any per-call board/list/due hints.
fn user_prompt(
    request: &str,
    board: &Option<String>,
    list: &Option<String>,
    due: &Option<String>,
) -> String {
    let mut prompt = request.to_string();
    if let Some(board) = board {
        prompt.push_str(&format!("\nBoard: {}", board));
    }
    if let Some(list) = list {
        prompt.push_str(&format!("\nLista: {}", list));
    }
    if let Some(due) = due {
        prompt.push_str(&format!("\nPrazo: {}", due));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_plain_request() {
        let prompt = user_prompt("cria um card de teste", &None, &None, &None);
        assert_eq!(prompt, "cria um card de teste");
    }

    #[test]
    fn test_user_prompt_appends_hints() {
        let prompt = user_prompt(
            "autenticação JWT",
            &Some("S33WAXxl".to_string()),
            &Some("A fazer".to_string()),
            &Some("amanhã 18:00".to_string()),
        );
        assert!(prompt.starts_with("autenticação JWT"));
        assert!(prompt.contains("Board: S33WAXxl"));
        assert!(prompt.contains("Lista: A fazer"));
        assert!(prompt.contains("Prazo: amanhã 18:00"));
    }

    #[test]
    fn test_system_prompt_mentions_defaults() {
        let mut config = Config::default();
        config.trello.default_board = Some("https://trello.com/b/S33WAXxl/nocapital".to_string());
        config.trello.default_list = Some("A fazer".to_string());

        let prompt = system_prompt(&config);
        assert!(prompt.contains("https://trello.com/b/S33WAXxl/nocapital"));
        assert!(prompt.contains("'A fazer'"));
        assert!(prompt.contains("to_rfc3339"));
        assert!(prompt.contains("resolve_list_id"));
        assert!(prompt.contains("trello_create_card"));
    }
}
