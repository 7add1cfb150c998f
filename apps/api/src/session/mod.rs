//! Coaching sessions: the per-user onboarding, analysis and chat state.
//!
//! Flow: onboarding (optionally CV extraction) → submit → analysis → dashboard
//! and consultant chat. Nothing here is persisted; dropping the session (or
//! restarting the process) discards it.
//!
//! Locks are never held across a gateway call. Each long-running operation
//! takes the lock, claims its `InFlight` flag, snapshots what it needs,
//! releases the lock, awaits the gateway, then re-locks to apply the result.
//! Busy flags are only claimed and checked with the lock held.
//!
//! Sessions idle for longer than the store's TTL are evicted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::analysis::models::SkillGapChartPoint;
use crate::analysis::{CareerAnalysis, CareerAnalyzer};
use crate::chat::session::ChatSessionFactory;
use crate::chat::Conversation;
use crate::errors::AppError;
use crate::extraction::{CvDocument, ProfileExtractor};
use crate::in_flight::InFlight;
use crate::profile::models::Profile;
use crate::profile::onboarding::{OnboardingFlow, OnboardingStep};

pub mod handlers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppView {
    Onboarding,
    Dashboard,
    Chat,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub view: AppView,
    pub step: OnboardingStep,
    pub step_index: u8,
    pub submitted: bool,
    pub profile: Profile,
    /// CV extraction in flight; upload and skip are disabled.
    pub extracting: bool,
    /// Analysis in flight; submit and back are disabled.
    pub analyzing: bool,
    pub has_analysis: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub profile: Profile,
    pub analysis: CareerAnalysis,
    pub chart: Vec<SkillGapChartPoint>,
}

struct Outcome {
    analysis: CareerAnalysis,
    conversation: Arc<Conversation>,
}

struct SessionState {
    flow: OnboardingFlow,
    view: AppView,
    outcome: Option<Outcome>,
}

pub struct CoachingSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    extracting: InFlight,
    analyzing: InFlight,
    state: Mutex<SessionState>,
}

impl CoachingSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            extracting: InFlight::default(),
            analyzing: InFlight::default(),
            state: Mutex::new(SessionState {
                flow: OnboardingFlow::new(),
                view: AppView::Onboarding,
                outcome: None,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn view(&self) -> SessionView {
        let state = self.state.lock().await;
        self.render(&state)
    }

    fn render(&self, state: &SessionState) -> SessionView {
        SessionView {
            id: self.id,
            created_at: self.created_at,
            view: state.view,
            step: state.flow.step(),
            step_index: state.flow.step().index(),
            submitted: state.flow.is_submitted(),
            profile: state.flow.profile().clone(),
            extracting: self.extracting.is_active(),
            analyzing: self.analyzing.is_active(),
            has_analysis: state.outcome.is_some(),
        }
    }

    /// Call with `state` locked: flags are only claimed under that lock.
    fn ensure_idle(&self) -> Result<(), AppError> {
        if self.extracting.is_active() {
            return Err(AppError::Busy("CV analysis is still running".into()));
        }
        if self.analyzing.is_active() {
            return Err(AppError::Busy("profile analysis is still running".into()));
        }
        Ok(())
    }

    // ── Onboarding ──────────────────────────────────────────────────────────

    /// Runs CV extraction. On success the result is merged and the flow moves to
    /// the personal step; on failure the profile and step are left untouched.
    pub async fn upload_cv(
        &self,
        extractor: &dyn ProfileExtractor,
        document: CvDocument,
    ) -> Result<SessionView, AppError> {
        let _extracting = {
            let state = self.state.lock().await;
            let guard = self
                .extracting
                .try_begin()
                .ok_or_else(|| AppError::Busy("a CV is already being analyzed".into()))?;
            state.flow.check_upload()?;
            guard
        };

        let partial = extractor.extract(&document).await.map_err(|e| {
            error!("CV extraction failed for session {}: {e}", self.id);
            AppError::from(e)
        })?;

        let mut state = self.state.lock().await;
        let step = state.flow.apply_extraction(partial)?;
        info!("Session {} prefilled from CV, now at {step}", self.id);
        Ok(self.render(&state))
    }

    pub async fn skip_upload(&self) -> Result<SessionView, AppError> {
        let mut state = self.state.lock().await;
        self.ensure_idle()?;
        state.flow.skip_upload()?;
        Ok(self.render(&state))
    }

    pub async fn next(&self) -> Result<SessionView, AppError> {
        let mut state = self.state.lock().await;
        self.ensure_idle()?;
        state.flow.next()?;
        Ok(self.render(&state))
    }

    pub async fn back(&self) -> Result<SessionView, AppError> {
        let mut state = self.state.lock().await;
        self.ensure_idle()?;
        state.flow.back()?;
        Ok(self.render(&state))
    }

    /// Applies a local edit to the in-progress profile.
    pub async fn edit_profile<F, R>(&self, edit: F) -> Result<(R, SessionView), AppError>
    where
        F: FnOnce(&mut Profile) -> R,
    {
        let mut state = self.state.lock().await;
        self.ensure_idle()?;
        let result = edit(state.flow.profile_mut()?);
        Ok((result, self.render(&state)))
    }

    /// Sends the profile for analysis. On success the onboarding flow is closed,
    /// the dashboard becomes the current view and the chat is prepared.
    /// On failure the session stays on the final step with the profile intact.
    pub async fn submit(
        &self,
        analyzer: &dyn CareerAnalyzer,
        chat: Arc<dyn ChatSessionFactory>,
    ) -> Result<SessionView, AppError> {
        let (_analyzing, profile) = {
            let state = self.state.lock().await;
            let guard = self
                .analyzing
                .try_begin()
                .ok_or_else(|| AppError::Busy("the profile is already being analyzed".into()))?;
            (guard, state.flow.check_submit()?)
        };

        let analysis = analyzer.analyze(&profile).await.map_err(|e| {
            error!("Analysis failed for session {}: {e}", self.id);
            AppError::from(e)
        })?;

        let mut state = self.state.lock().await;
        let profile = state.flow.complete()?;
        info!(
            "Session {} analyzed: {} skill gaps, {} roadmap phases",
            self.id,
            analysis.skill_gaps.len(),
            analysis.roadmap.len()
        );
        state.outcome = Some(Outcome {
            analysis,
            conversation: Arc::new(Conversation::new(profile, chat)),
        });
        state.view = AppView::Dashboard;
        Ok(self.render(&state))
    }

    // ── After submission ────────────────────────────────────────────────────

    pub async fn set_view(&self, view: AppView) -> Result<SessionView, AppError> {
        let mut state = self.state.lock().await;
        if state.outcome.is_none() || view == AppView::Onboarding {
            return Err(AppError::InvalidTransition(format!(
                "cannot switch to {view:?} view {}",
                if state.outcome.is_none() {
                    "before the profile has been analyzed"
                } else {
                    "after onboarding was submitted"
                }
            )));
        }
        state.view = view;
        Ok(self.render(&state))
    }

    pub async fn dashboard(&self) -> Result<DashboardView, AppError> {
        let state = self.state.lock().await;
        let outcome = state.outcome.as_ref().ok_or_else(not_analyzed)?;
        Ok(DashboardView {
            profile: state.flow.profile().clone(),
            analysis: outcome.analysis.clone(),
            chart: outcome.analysis.chart_points(),
        })
    }

    pub async fn conversation(&self) -> Result<Arc<Conversation>, AppError> {
        let state = self.state.lock().await;
        state
            .outcome
            .as_ref()
            .map(|o| o.conversation.clone())
            .ok_or_else(not_analyzed)
    }
}

fn not_analyzed() -> AppError {
    AppError::InvalidTransition("the profile has not been analyzed yet".into())
}

/// Idle time after which a session is discarded.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    session: Arc<CoachingSession>,
    last_active: Instant,
}

/// In-memory registry of live coaching sessions.
///
/// Every lookup refreshes the session's activity time. A session idle for at
/// least `ttl` is gone: lookups report it as not found, and `evict_idle`
/// reclaims it.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self) -> Arc<CoachingSession> {
        let session = Arc::new(CoachingSession::new());
        self.sessions.write().await.insert(
            session.id(),
            Entry {
                session: session.clone(),
                last_active: Instant::now(),
            },
        );
        info!("Created coaching session {}", session.id());
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<CoachingSession>, AppError> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        match sessions.get_mut(&id) {
            Some(entry) if now.duration_since(entry.last_active) < self.ttl => {
                entry.last_active = now;
                Ok(entry.session.clone())
            }
            Some(_) => {
                sessions.remove(&id);
                info!("Coaching session {id} expired");
                Err(not_found(id))
            }
            None => Err(not_found(id)),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Discarded coaching session {id}"))
            .ok_or_else(|| not_found(id))
    }

    /// Drops every session idle for at least the TTL. Returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, entry| now.duration_since(entry.last_active) < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle coaching sessions");
        }
        evicted
    }

    /// Runs `evict_idle` every `period` until the returned task is aborted.
    pub fn spawn_eviction(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // first tick is immediate
            loop {
                interval.tick().await;
                let evicted = store.evict_idle().await;
                debug!("Session sweep evicted {evicted}");
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
