use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::CardClient;
use crate::id::SpeciesId;
use crate::inline::{inline_or_fallback, InlinedAsset};
use crate::profile::{fetch_activity_summary, fetch_profile, Profile};
use crate::render::{CardSurface, CardView};
use crate::species::{fetch_species, Species};
use crate::theme::{Theme, TypeName};
use crate::{CardError, Outcome, Result};

/// One independently settable piece of card state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    Empty,
    Loading,
    Ready(T),
    Failed,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T> Slot<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Slot::Loading)
    }

    fn settle(&mut self, outcome: Outcome<T>, error: &mut Option<String>) {
        if let Some(message) = outcome.user_message() {
            *error = Some(message);
        }
        *self = match outcome {
            Outcome::Ok(value) => Slot::Ready(value),
            Outcome::SurfacedFail(e) => {
                log::warn!("{e}");
                Slot::Failed
            }
            Outcome::SilentFail(e) => {
                log::debug!("ignoring side channel failure: {e}");
                Slot::Failed
            }
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A primary fetch of the current submission is still running.
    Pending,
    /// Profile and species both resolved, successfully or not.
    Settled,
}

/// Everything the card shows, for the current submission only.
#[derive(Debug, Clone, Default)]
pub struct CardState {
    pub epoch: u64,
    pub phase: Phase,
    pub username: Option<String>,
    pub species_id: Option<SpeciesId>,
    pub profile: Slot<Profile>,
    pub avatar: Option<InlinedAsset>,
    pub species: Slot<Species>,
    pub sprite: Option<InlinedAsset>,
    pub commits: Slot<u64>,
    pub error: Option<String>,
}

impl CardState {
    /// Primary type of the held species.
    pub fn active_type(&self) -> Option<TypeName> {
        self.species.ready()?.primary_type_name()
    }

    pub fn theme(&self) -> Theme {
        Theme::resolve(self.species.ready().and_then(Species::primary_type))
    }

    pub fn view(&self) -> CardView {
        CardView::from_state(self, Utc::now())
    }

    fn refresh_phase(&mut self) {
        if self.phase == Phase::Pending
            && !self.profile.is_loading()
            && !self.species.is_loading()
        {
            self.phase = Phase::Settled;
        }
    }
}

/// Drives one card: derives the species id, runs the profile, species and
/// activity fetches concurrently and merges their results.
///
/// Every submission gets a new epoch. Fetch tasks capture the epoch they
/// were started with and their results are dropped once it is outdated, so
/// a slow response of an abandoned submission never lands in newer state.
pub struct CardComposer {
    client: CardClient,
    state: Arc<watch::Sender<CardState>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CardComposer {
    pub fn new(client: CardClient) -> Self {
        let (state, _) = watch::channel(CardState::default());
        Self {
            client,
            state: Arc::new(state),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start a new submission for `input` and return its epoch.
    ///
    /// Must be called from within a tokio runtime. Blank input is rejected
    /// and leaves the current card untouched.
    pub fn submit(&self, input: &str) -> Result<u64> {
        let username = input.trim();
        if username.is_empty() {
            return Err(CardError::EmptyUsername);
        }
        let username = username.to_owned();
        let id = SpeciesId::derive(&username);

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }

        let mut epoch = 0;
        self.state.send_modify(|state| {
            epoch = state.epoch + 1;
            *state = CardState {
                epoch,
                phase: Phase::Pending,
                username: Some(username.clone()),
                species_id: Some(id),
                profile: Slot::Loading,
                species: Slot::Loading,
                commits: Slot::Loading,
                ..CardState::default()
            };
        });
        log::debug!("submission {epoch}: {username} -> species {id}");

        tasks.push(tokio::spawn(load_profile(
            self.client.clone(),
            self.state.clone(),
            epoch,
            username.clone(),
        )));
        tasks.push(tokio::spawn(load_species(
            self.client.clone(),
            self.state.clone(),
            epoch,
            id,
        )));
        tasks.push(tokio::spawn(load_activity(
            self.client.clone(),
            self.state.clone(),
            epoch,
            username,
        )));

        Ok(epoch)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CardState> {
        self.state.subscribe()
    }

    /// Wait until both primary fetches of the current submission resolved.
    pub async fn settled(&self) -> CardState {
        self.wait_for(|state| state.phase != Phase::Pending).await
    }

    /// Like [`settled`](Self::settled), but also waits for the activity
    /// side channel.
    pub async fn finished(&self) -> CardState {
        self.wait_for(|state| state.phase != Phase::Pending && !state.commits.is_loading())
            .await
    }

    async fn wait_for(&self, done: impl FnMut(&CardState) -> bool) -> CardState {
        let mut rx = self.state.subscribe();
        let result = rx.wait_for(done).await.map(|state| state.clone());
        match result {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }

    pub fn view(&self) -> CardView {
        self.state.borrow().view()
    }

    /// The rendered card, `None` until something has been submitted.
    pub fn surface(&self) -> Option<CardSurface> {
        let state = self.state.borrow();
        (state.phase != Phase::Idle).then(|| CardSurface::new(state.view()))
    }
}

impl Drop for CardComposer {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

/// Apply `update` unless a newer submission started in the meantime.
fn apply<F>(state: &watch::Sender<CardState>, epoch: u64, update: F) -> bool
where
    F: FnOnce(&mut CardState),
{
    state.send_if_modified(|current| {
        if current.epoch != epoch {
            log::trace!(
                "dropping result of submission {epoch}, current is {}",
                current.epoch
            );
            return false;
        }
        update(current);
        current.refresh_phase();
        true
    })
}

async fn load_profile(
    client: CardClient,
    state: Arc<watch::Sender<CardState>>,
    epoch: u64,
    username: String,
) {
    let result = fetch_profile(&client, &username).await;
    let avatar = match result.as_ref().ok().and_then(Profile::avatar) {
        Some(url) => Some(inline_or_fallback(&client, url).await),
        None => None,
    };

    apply(&state, epoch, |current| {
        current
            .profile
            .settle(Outcome::surfaced(result), &mut current.error);
        current.avatar = current.profile.ready().and(avatar);
    });
}

async fn load_species(
    client: CardClient,
    state: Arc<watch::Sender<CardState>>,
    epoch: u64,
    id: SpeciesId,
) {
    let result = fetch_species(&client, id).await;
    let sprite = match result.as_ref().ok().and_then(Species::sprite_url) {
        Some(url) => Some(inline_or_fallback(&client, url).await),
        None => None,
    };

    apply(&state, epoch, |current| {
        current
            .species
            .settle(Outcome::surfaced(result), &mut current.error);
        current.sprite = current.species.ready().and(sprite);
    });
}

async fn load_activity(
    client: CardClient,
    state: Arc<watch::Sender<CardState>>,
    epoch: u64,
    username: String,
) {
    let result = fetch_activity_summary(&client, &username).await;
    if let Err(CardError::RateLimited(message)) = &result {
        log::warn!("activity for {username} is rate limited: {message}");
    }

    apply(&state, epoch, |current| {
        current
            .commits
            .settle(Outcome::silent(result), &mut current.error);
    });
}
