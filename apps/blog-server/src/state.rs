//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::PublishedPosts;
use blog_core::domain::User;
use blog_core::ports::{
    BaseRepository, CommentRepository, Mailer, PasswordService, PostRepository, TagRepository,
    TokenService, UserRepository,
};
use blog_infra::{Argon2PasswordService, ConsoleMailer, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use blog_infra::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

use crate::config::{AdminBootstrap, AppConfig};
use crate::middleware::error::{AppError, AppResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    /// Reader-facing view over `posts`.
    pub published: PublishedPosts,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let mailer = build_mailer(config);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

        #[cfg(feature = "postgres")]
        let state = match &config.database {
            Some(db_config) => match db_config.connect().await {
                Ok(conn) => Self::assemble(
                    Arc::new(PostgresUserRepository::new(conn.clone())),
                    Arc::new(PostgresPostRepository::new(conn.clone())),
                    Arc::new(PostgresCommentRepository::new(conn.clone())),
                    Arc::new(PostgresTagRepository::new(conn)),
                    mailer,
                    tokens,
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory store.",
                        e
                    );
                    Self::in_memory(Arc::new(InMemoryStore::new()), mailer, tokens)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                Self::in_memory(Arc::new(InMemoryStore::new()), mailer, tokens)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            tracing::info!("Running without postgres feature - using in-memory store");
            Self::in_memory(Arc::new(InMemoryStore::new()), mailer, tokens)
        };

        if let Some(admin) = &config.admin {
            if let Err(e) = state.bootstrap_admin(admin).await {
                tracing::error!(error = %e, "Failed to create staff account");
            }
        }

        tracing::info!("Application state initialized");
        state
    }

    /// State backed entirely by one in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        mailer: Arc<dyn Mailer>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self::assemble(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            mailer,
            tokens,
        )
    }

    fn assemble(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        tags: Arc<dyn TagRepository>,
        mailer: Arc<dyn Mailer>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            published: PublishedPosts::new(posts.clone()),
            users,
            posts,
            comments,
            tags,
            mailer,
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    /// Create the configured staff account unless the email is taken.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> AppResult<()> {
        if self.users.find_by_email(&admin.email).await?.is_some() {
            tracing::debug!("Staff account already present");
            return Ok(());
        }

        let password_hash = self
            .passwords
            .hash(&admin.password)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let username = admin
            .email
            .split('@')
            .next()
            .unwrap_or("admin")
            .to_string();

        let user = User::new(username, admin.email.clone(), password_hash).staff();
        self.users.save(user).await?;
        tracing::info!("Staff account created");
        Ok(())
    }
}

fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    #[cfg(feature = "smtp")]
    if let Some(smtp) = &config.smtp {
        use blog_infra::{SmtpConfig, SmtpMailer, SmtpSecurity};

        let mut smtp_config =
            SmtpConfig::new(smtp.host.clone(), smtp.port, config.default_from_email.clone());
        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            smtp_config = smtp_config.with_credentials(username.clone(), password.clone());
        }
        if let Some(security) = smtp.security.as_deref().and_then(SmtpSecurity::parse) {
            smtp_config = smtp_config.with_security(security);
        }

        match SmtpMailer::new(smtp_config) {
            Ok(mailer) => return Arc::new(mailer),
            Err(e) => tracing::error!("Failed to configure SMTP: {}. Using console mail.", e),
        }
    }

    #[cfg(not(feature = "smtp"))]
    if config.smtp.is_some() {
        tracing::warn!("SMTP_HOST set but the smtp feature is disabled. Using console mail.");
    }

    Arc::new(ConsoleMailer::new(config.default_from_email.clone()))
}
