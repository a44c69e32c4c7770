use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::ResetMailer;
use crate::rate_limit::AttemptLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub mailer: Option<Arc<ResetMailer>>,
    pub login_limiter: AttemptLimiter,
    pub reset_limiter: AttemptLimiter,
}
