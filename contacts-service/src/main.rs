use contacts_service::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let state = AppState::in_memory(config.clone());
    let app = router(state)?;

    Server::new(config).serve(app).await
}
