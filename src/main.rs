use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use dadnovin::application::ports::{ConversationRepository, UserRepository};
use dadnovin::application::services::{
    AccessService, AccountService, ChatService, ChatSettings, ConversationRegistry,
    ConversationService, IngestionService, RegistryConfig, RetrievalService,
};
use dadnovin::domain::utc_offset;
use dadnovin::infrastructure::auth::{BcryptPasswordHasher, JwtTokenService};
use dadnovin::infrastructure::llm::{OpenAiEmbedder, create_streaming_llm_client};
use dadnovin::infrastructure::observability::{TracingConfig, init_tracing};
use dadnovin::infrastructure::persistence::{
    InMemoryConversationRepository, InMemoryUserRepository, InMemoryVectorStore,
    JsonSnapshotStore, PgConversationRepository, PgUserRepository, create_pool, run_migrations,
};
use dadnovin::infrastructure::text_processing::{RecursiveCharacterSplitter, TextDirectoryLoader};
use dadnovin::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(|e| anyhow!(e))?;
    let settings = Settings::load(environment).context("failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging))?;
    tracing::info!(%environment, "Application starting");

    let timezone = utc_offset(settings.subscription.utc_offset_minutes)
        .ok_or_else(|| anyhow!("invalid utc offset: {}", settings.subscription.utc_offset_minutes))?;

    let (users, conversations): (Arc<dyn UserRepository>, Arc<dyn ConversationRepository>) =
        match settings.database.url.as_deref() {
            Some(url) => {
                let pool = create_pool(url, &settings.database).await?;
                if settings.database.run_migrations {
                    run_migrations(&pool).await?;
                }
                (
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgConversationRepository::new(pool)),
                )
            }
            None => {
                tracing::warn!("database.url not set, keeping users and conversations in memory");
                (
                    Arc::new(InMemoryUserRepository::new()),
                    Arc::new(InMemoryConversationRepository::new()),
                )
            }
        };

    let embedder = Arc::new(OpenAiEmbedder::new(
        &settings.embeddings.base_url,
        settings.embeddings.api_key.clone(),
        settings.embeddings.model.clone(),
        std::time::Duration::from_secs(settings.embeddings.connect_timeout_secs),
        std::time::Duration::from_secs(settings.embeddings.request_timeout_secs),
    )?);
    let vector_store = Arc::new(InMemoryVectorStore::new());
    let splitter = Arc::new(RecursiveCharacterSplitter::new(
        settings.chunking.chunk_size,
        settings.chunking.chunk_overlap,
    )?);

    let ingestion_service = IngestionService::new(
        Arc::new(TextDirectoryLoader::new(splitter)),
        embedder.clone(),
        vector_store.clone(),
        Arc::new(JsonSnapshotStore::new(&settings.retrieval.snapshot_path)),
    );
    if let Err(e) = ingestion_service
        .load_or_create(&settings.retrieval.data_dir)
        .await
    {
        tracing::error!(error = %e, "vector store unavailable, answering without retrieved context");
    }

    let retrieval_service = Arc::new(RetrievalService::new(
        embedder,
        vector_store,
        settings.retrieval.similarity_threshold,
    ));

    let registry = Arc::new(ConversationRegistry::new(RegistryConfig {
        ttl: std::time::Duration::from_secs(settings.registry.ttl_secs),
        reap_interval: std::time::Duration::from_secs(settings.registry.reap_interval_secs),
        max_messages: settings.registry.max_messages,
    }));

    let shutdown = CancellationToken::new();
    let reaper = registry.spawn_reaper(shutdown.clone());

    let llm_client = Arc::new(create_streaming_llm_client(&settings.llm)?);
    let chat_service = Arc::new(ChatService::new(
        conversations.clone(),
        registry.clone(),
        retrieval_service,
        llm_client,
        ChatSettings {
            top_k: settings.retrieval.top_k,
            temperature: settings.llm.temperature,
            stream_idle_timeout: settings.llm.stream_idle_timeout(),
        },
    ));

    let tokens = Arc::new(JwtTokenService::new(
        &settings.auth.jwt_secret,
        chrono::Duration::hours(settings.auth.token_ttl_hours),
    )?);
    let access_service = Arc::new(AccessService::new(users.clone(), tokens.clone(), timezone));
    let account_service = Arc::new(AccountService::new(
        users,
        Arc::new(BcryptPasswordHasher::new(settings.auth.bcrypt_cost)),
        tokens,
        settings.subscription.trial_days,
    ));
    let conversation_service = Arc::new(ConversationService::new(conversations, registry));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;

    let state = AppState {
        access_service,
        account_service,
        conversation_service,
        chat_service,
        settings: Arc::new(settings),
    };
    let router = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Err(e) = reaper.await {
        tracing::warn!(error = %e, "conversation reaper did not stop cleanly");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
    shutdown.cancel();
}
