#![allow(dead_code)]

//! In-memory fixtures shared by the integration tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use shortlink_platform::application::services::{AuthService, LinkService, StatsService};
use shortlink_platform::codegen::{CodePipeline, CodeStore, PipelineConfig};
use shortlink_platform::domain::click_event::ClickEvent;
use shortlink_platform::domain::entities::{
    AuthContext, Link, LinkStats, NewLink, NewUser, ROLE_ADMIN, User,
};
use shortlink_platform::domain::repositories::{LinkRepository, TokenRepository, UserRepository};
use shortlink_platform::error::AppError;
use shortlink_platform::infrastructure::cache::NullCache;
use shortlink_platform::state::AppState;

/// Durable-store stand-in for pipeline tests: a set of issued codes with an
/// optional failure switch and probe counting.
#[derive(Default)]
pub struct InMemoryCodeStore {
    codes: Mutex<HashSet<String>>,
    failing: AtomicBool,
    probes: AtomicUsize,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            codes: Mutex::new(codes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.lock().unwrap().contains(code)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn code_exists(&self, code: &str) -> anyhow::Result<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }

        Ok(self.contains(code))
    }
}

/// Store whose probes dwell briefly and record how many run at once.
///
/// A refill pass probes serially, so any concurrency observed here proves
/// two passes were active at the same time.
#[derive(Default)]
pub struct ProbeCountingStore {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ProbeCountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_concurrent_probes(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeStore for ProbeCountingStore {
    async fn code_exists(&self, _code: &str) -> anyhow::Result<bool> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(2)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(false)
    }
}

/// Store that replays a scripted sequence of probe answers, then reports
/// every further candidate as free.
pub struct ScriptedStore {
    answers: Mutex<Vec<bool>>,
    probes: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: Mutex::new(answers),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeStore for ScriptedStore {
    async fn code_exists(&self, _code: &str) -> anyhow::Result<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        let mut answers = self.answers.lock().unwrap();
        if answers.is_empty() {
            Ok(false)
        } else {
            Ok(answers.remove(0))
        }
    }
}

/// In-memory link repository mirroring the PostgreSQL semantics, including
/// the unique-code constraint and soft-delete visibility rules.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<Link>>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();

        // Mirrors the unique constraint: deleted rows still hold their code.
        if links.iter().any(|l| l.code == new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({ "constraint": "links_code_key" }),
            ));
        }

        let link = Link {
            id: links.len() as i64 + 1,
            code: new_link.code,
            long_url: new_link.long_url,
            click_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        links.push(link.clone());

        Ok(link)
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .find(|l| l.code == code && l.is_active && l.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .find(|l| l.code == code && l.deleted_at.is_none())
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError> {
        let links = self.links.lock().unwrap();

        let mut live: Vec<Link> = links
            .iter()
            .filter(|l| l.deleted_at.is_none())
            .cloned()
            .collect();
        live.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(live
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        let mut links = self.links.lock().unwrap();
        if let Some(link) = links
            .iter_mut()
            .find(|l| l.code == code && l.deleted_at.is_none())
        {
            link.click_count += 1;
        }
        Ok(())
    }

    async fn set_active(&self, code: &str, active: bool) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        match links
            .iter_mut()
            .find(|l| l.code == code && l.deleted_at.is_none())
        {
            Some(link) => {
                link.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        match links
            .iter_mut()
            .find(|l| l.code == code && l.deleted_at.is_none())
        {
            Some(link) => {
                link.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links.iter().any(|l| l.code == code))
    }

    async fn aggregate_stats(&self) -> Result<LinkStats, AppError> {
        let links = self.links.lock().unwrap();
        let live: Vec<&Link> = links.iter().filter(|l| l.deleted_at.is_none()).collect();

        Ok(LinkStats {
            total_links: live.len() as i64,
            total_clicks: live.iter().map(|l| l.click_count).sum(),
            active_links: live.iter().filter(|l| l.is_active).count() as i64,
        })
    }
}

#[async_trait]
impl CodeStore for InMemoryLinkRepository {
    async fn code_exists(&self, code: &str) -> anyhow::Result<bool> {
        Ok(LinkRepository::code_exists(self, code).await?)
    }
}

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deactivate(&self, username: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.username == username) {
            user.is_active = false;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();

        if users
            .iter()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({ "constraint": "users_username_key" }),
            ));
        }

        let user = User {
            id: users.len() as i64 + 1,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_last_login(&self, id: i64) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

/// In-memory token repository joined against the user fixture.
pub struct InMemoryTokenRepository {
    tokens: Mutex<Vec<StoredToken>>,
    users: Arc<InMemoryUserRepository>,
}

struct StoredToken {
    user_id: i64,
    token_hash: String,
    expires_at: chrono::DateTime<Utc>,
}

impl InMemoryTokenRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            tokens: Mutex::new(Vec::new()),
            users,
        }
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn insert(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.tokens.lock().unwrap().push(StoredToken {
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
        });
        Ok(())
    }

    async fn resolve(&self, token_hash: &str) -> Result<Option<AuthContext>, AppError> {
        let user_id = {
            let tokens = self.tokens.lock().unwrap();
            match tokens
                .iter()
                .find(|t| t.token_hash == token_hash && t.expires_at > Utc::now())
            {
                Some(token) => token.user_id,
                None => return Ok(None),
            }
        };

        let user = self.users.find_by_id(user_id).await?;

        Ok(user.filter(|u| u.is_active).map(|u| AuthContext {
            user_id: u.id,
            username: u.username,
            role: u.role,
        }))
    }
}

/// Everything a handler test needs: wired state plus direct fixture access.
pub struct TestContext {
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub pipeline: CodePipeline,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret";

/// Builds an [`AppState`] over in-memory fixtures with a primed code supply.
pub async fn create_test_state() -> TestContext {
    let links = Arc::new(InMemoryLinkRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let tokens = Arc::new(InMemoryTokenRepository::new(users.clone()));
    let cache = Arc::new(NullCache::new());

    let code_store: Arc<dyn CodeStore> = links.clone();
    let pipeline = CodePipeline::new(
        code_store,
        PipelineConfig {
            code_length: 6,
            capacity: 32,
            low_water: 4,
            monitor_interval: Duration::from_millis(50),
            retry_backoff: Duration::from_millis(5),
            max_probe_attempts: 10,
        },
    );
    pipeline.refill_now().await;

    let (click_tx, click_rx) = mpsc::channel(100);

    let link_service = Arc::new(LinkService::new(
        links.clone(),
        cache.clone(),
        pipeline.clone(),
        "https://s.test".to_string(),
    ));
    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        tokens,
        TEST_SIGNING_SECRET.to_string(),
        24,
    ));
    let stats_service = Arc::new(StatsService::new(links.clone()));

    let state = AppState {
        link_service,
        auth_service,
        stats_service,
        cache,
        click_sender: click_tx,
        code_supply: pipeline.clone(),
    };

    TestContext {
        state,
        links,
        users,
        pipeline,
        click_rx,
    }
}

/// Registers an administrator and returns a bearer token for them.
pub async fn create_admin(ctx: &TestContext, username: &str) -> String {
    let password_hash = ctx
        .state
        .auth_service
        .hash_password("admin-password")
        .unwrap();

    ctx.users
        .create(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        })
        .await
        .unwrap();

    let (_, token) = ctx
        .state
        .auth_service
        .login(username, "admin-password")
        .await
        .unwrap();

    token
}

/// Polls `condition` until it holds or the timeout elapses.
pub async fn wait_for(condition: impl Fn() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);

    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
