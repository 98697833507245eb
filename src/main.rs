use std::{future::IntoFuture, process, sync::Arc};

use primer::{
    application::{
        auth::AuthService,
        error::AppError,
        items::ItemService,
        seed::seed_sample_data,
        users::UserService,
    },
    cache::{CacheConfig, ItemCache},
    config,
    infra::{
        Repositories,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, GreetingCounter, HttpCachePolicy},
        memory::InMemoryRepositories,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = cache_config
        .enabled
        .then(|| Arc::new(ItemCache::new(&cache_config)));
    let items = Arc::new(ItemService::new(
        repositories.items.clone(),
        repositories.items_write.clone(),
        cache,
    ));

    if settings.seed.sample_data {
        seed_sample_data(
            &items,
            repositories.users.as_ref(),
            repositories.users_write.as_ref(),
        )
        .await?;
    }

    let users = Arc::new(UserService::new(repositories.users.clone()));
    let auth = Arc::new(AuthService::new(users, &settings.auth.jwt_signing_key));

    let state = ApiState {
        items,
        auth,
        health: repositories.health.clone(),
        http_cache: HttpCachePolicy {
            max_age: settings.http.cache_max_age,
        },
        greetings: Arc::new(GreetingCounter::default()),
    };

    serve_http(&settings, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::from(InfraError::configuration(
            "database.url is required to run migrations",
        ))
    })?;

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    info!(target = "primer::migrate", "migrations applied");
    Ok(())
}

async fn init_repositories(settings: &config::Settings) -> Result<Repositories, AppError> {
    let Some(url) = settings.database.url.as_deref() else {
        warn!(
            target = "primer::bootstrap",
            "no database url configured; using in-memory repositories"
        );
        return Ok(Repositories::in_memory(Arc::new(InMemoryRepositories::new())));
    };

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    info!(target = "primer::bootstrap", "connected to postgres");
    Ok(Repositories::postgres(Arc::new(PostgresRepositories::new(
        pool,
    ))))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "primer::bootstrap",
        addr = %settings.server.addr,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            let _ = shutdown_rx.changed().await;
        },
    );

    let signal = async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "primer::bootstrap", error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!(target = "primer::bootstrap", "shutdown signal received");
        let _ = shutdown_tx.send(true);
    };

    let mut server = std::pin::pin!(server.into_future());
    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::from(InfraError::server(err.to_string())));
        }
        () = signal => {}
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.map_err(|err| AppError::from(InfraError::server(err.to_string()))),
        Err(_) => {
            warn!(
                target = "primer::bootstrap",
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}
