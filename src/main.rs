use anyhow::Context;
use clap::Parser;
use rankshift::config::{Cli, Command, FileConfig, DEFAULT_STORE_PATH};
use rankshift::utils::logger;
use rankshift::utils::validation::validate_non_empty_string;
use rankshift::{
    BatchMoveRequest, ItemId, JsonFileStore, RankError, RankStore, ReorderCoordinator, ScopeId,
    ScopeSnapshot,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => {
            FileConfig::load(path).with_context(|| format!("loading config file {path}"))?
        }
        None => FileConfig::default(),
    };

    match file_config.log_format() {
        "json" => logger::init_json_logger(),
        _ => logger::init_cli_logger(cli.verbose),
    }

    let store_path = cli
        .store
        .clone()
        .or_else(|| file_config.store_path.clone())
        .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
    tracing::debug!(store = %store_path, "using rank store");

    let coordinator = ReorderCoordinator::new(JsonFileStore::new(&store_path));

    if let Err(err) = run(&cli.command, &coordinator).await {
        tracing::error!(%err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(exit_code(&err));
    }

    Ok(())
}

async fn run(
    command: &Command,
    coordinator: &ReorderCoordinator<JsonFileStore>,
) -> rankshift::Result<()> {
    match command {
        Command::Show { scope } => {
            let scope = parse_scope(scope)?;
            let snapshot = coordinator.store().load_scope(&scope).await?;
            print_scope(&snapshot);
        }
        Command::Add { scope, id } => {
            let scope = parse_scope(scope)?;
            validate_non_empty_string("id", id)?;
            let item = coordinator
                .store()
                .insert_item(&scope, ItemId::new(id.clone()), chrono::Utc::now())
                .await?;
            println!("added '{}' to '{}' at rank {}", item.id, scope, item.rank);
        }
        Command::Move { scope, id, rank } => {
            let scope = parse_scope(scope)?;
            validate_non_empty_string("id", id)?;
            let snapshot = coordinator
                .single_move(&scope, &ItemId::new(id.clone()), *rank)
                .await?;
            print_scope(&snapshot);
        }
        Command::Batch { scope, file } => {
            let scope = parse_scope(scope)?;
            let batch = read_batch(file)?;
            let snapshot = coordinator.batch_move(&scope, &batch).await?;
            print_scope(&snapshot);
        }
    }
    Ok(())
}

fn parse_scope(raw: &str) -> rankshift::Result<ScopeId> {
    validate_non_empty_string("scope", raw)?;
    Ok(ScopeId::new(raw))
}

fn read_batch(path: &str) -> rankshift::Result<BatchMoveRequest> {
    let raw = std::fs::read_to_string(path).map_err(|err| RankError::InvalidConfigValue {
        field: "batch file".to_string(),
        value: path.to_string(),
        reason: err.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|err| RankError::InvalidConfigValue {
        field: "batch file".to_string(),
        value: path.to_string(),
        reason: err.to_string(),
    })
}

fn print_scope(snapshot: &ScopeSnapshot) {
    if snapshot.is_empty() {
        println!("scope '{}' is empty", snapshot.scope());
        return;
    }
    for item in snapshot.items() {
        println!("{:>4}  {}", item.rank, item.id);
    }
}

fn exit_code(err: &RankError) -> i32 {
    match err {
        RankError::ItemNotFound { .. }
        | RankError::RankOutOfRange { .. }
        | RankError::InvalidConfigValue { .. } => 2,
        RankError::ConcurrentModification { .. } => 3,
        RankError::PersistenceFailure { .. } => 4,
    }
}
