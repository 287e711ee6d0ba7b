//! Pagination sessions.
//!
//! [`paginate`] sends the first page with `left-<owner>` / `right-<owner>`
//! buttons and spawns a session task that owns the page list. The session is
//! registered in the runtime's [`SessionRegistry`] under the id of the sent
//! message; the router forwards later presses and deletions of that message
//! to it.
//!
//! ```text
//!            left / right (owner)
//!           ┌──────────────────┐
//!           ▼                  │
//!     ┌────────────┐───────────┘      idle timeout    ┌─────────────────────┐
//!  ──▶│ Active(i)  │─────────────────────────────────▶│ Ended (controls off)│
//!     └────────────┘                                  └─────────────────────┘
//!        │      │ host deleted / shutdown             ┌─────────────────────┐
//!        │      └────────────────────────────────────▶│ Ended (no render)   │
//!        │ press by anyone else: one denial notice    └─────────────────────┘
//!        └──▶ (state and deadline unchanged)
//! ```
//!
//! The idle deadline slides: every accepted navigation resets it to
//! `now + timeout`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{Instrument, Level, debug, span, trace, warn};

use davinci_core::{ActionRow, Button, ButtonPress, ButtonStyle, Embed, MessageRef, Origin, Reply};

use crate::button::{ButtonToken, denial_reply};
use crate::constants::emojis;
use crate::context::{InvocationContext, RuntimeContext};
use crate::error::{HandlerError, HandlerResult};

/// Buffered signals per session before the router's send waits.
const SIGNAL_BUFFER: usize = 16;

// =============================================================================
// Pure state
// =============================================================================

/// A navigation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Left,
    Right,
}

impl Navigation {
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Current page of a fixed, non-empty page list. Navigation wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    index: usize,
    len: usize,
}

impl PaginationState {
    /// Starts on the first page. A zero length is treated as one page.
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
        }
    }

    pub fn at(index: usize, len: usize) -> Self {
        let len = len.max(1);
        Self {
            index: index % len,
            len,
        }
    }

    /// Applies a navigation and returns the new index.
    pub fn navigate(&mut self, navigation: Navigation) -> usize {
        self.index = match navigation {
            Navigation::Left => (self.index + self.len - 1) % self.len,
            Navigation::Right => (self.index + 1) % self.len,
        };
        self.index
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn page_count(&self) -> usize {
        self.len
    }

    /// `Page k / n`, one-based.
    pub fn footer(&self) -> String {
        format!("Page {} / {}", self.index + 1, self.len)
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    IdleTimeout,
    HostDeleted,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active(usize),
    Ended(EndReason),
}

/// Observable session progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Accepted navigations so far.
    pub navigations: usize,
    /// Presses rejected because the actor was not the owner.
    pub denials: usize,
}

// =============================================================================
// Registry
// =============================================================================

/// Input delivered to a live session.
#[derive(Debug, Clone)]
pub enum SessionSignal {
    Press(ButtonPress),
    HostDeleted,
}

/// Live sessions keyed by the id of the message they control.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, mpsc::Sender<SessionSignal>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, message_id: impl Into<String>, sender: mpsc::Sender<SessionSignal>) {
        self.sessions.write().insert(message_id.into(), sender);
    }

    pub fn remove(&self, message_id: &str) -> bool {
        self.sessions.write().remove(message_id).is_some()
    }

    /// Returns the signal sender of the session controlling a message.
    pub fn sender(&self, message_id: &str) -> Option<mpsc::Sender<SessionSignal>> {
        self.sessions.read().get(message_id).cloned()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.sessions.read().contains_key(message_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

// =============================================================================
// Session
// =============================================================================

/// Handle to a spawned session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    message: MessageRef,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// The controlled message.
    pub fn message(&self) -> &MessageRef {
        &self.message
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        *self.snapshot.borrow()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    /// Waits until the snapshot satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> SessionSnapshot {
        let result = self.snapshot.wait_for(predicate).await.map(|s| *s);
        result.unwrap_or_else(|_| *self.snapshot.borrow())
    }

    /// Waits for the session to end.
    pub async fn ended(&mut self) -> Option<EndReason> {
        match self
            .wait_for(|s| matches!(s.state, SessionState::Ended(_)))
            .await
            .state
        {
            SessionState::Ended(reason) => Some(reason),
            SessionState::Active(_) => None,
        }
    }
}

/// Sends `pages` as a paginated embed and starts its session.
///
/// The actor of `ctx` owns the session; only they may navigate.
pub async fn paginate(ctx: &InvocationContext, pages: Vec<Embed>) -> HandlerResult<SessionHandle> {
    if pages.is_empty() {
        return Err(HandlerError::other("cannot paginate an empty page list"));
    }

    let owner = ctx.actor().id.clone();
    let controls = controls(&owner);
    let state = PaginationState::new(pages.len());
    let timeout = ctx.settings().pagination_timeout;

    let message = ctx.reply(render(&pages, &state, &controls, false)).await?;
    let deadline = Instant::now() + timeout;

    let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_BUFFER);
    let (snapshot_tx, snapshot) = watch::channel(SessionSnapshot {
        state: SessionState::Active(0),
        navigations: 0,
        denials: 0,
    });

    let runtime = ctx.runtime();
    runtime
        .sessions()
        .register(message.message_id.clone(), signal_tx);

    let span = span!(
        Level::DEBUG,
        "pagination",
        message_id = %message.message_id,
        owner = %owner,
        pages = pages.len()
    );
    let session = Session {
        runtime: Arc::clone(runtime),
        message: message.clone(),
        owner,
        pages,
        state,
        controls,
        timeout,
        snapshot: snapshot_tx,
    };
    runtime
        .tasks()
        .spawn(session.run(signal_rx, deadline).instrument(span));

    Ok(SessionHandle { message, snapshot })
}

fn render(pages: &[Embed], state: &PaginationState, controls: &ActionRow, disabled: bool) -> Reply {
    let page = pages[state.index()].clone().footer(state.footer(), None);
    let row = if disabled {
        controls.disabled()
    } else {
        controls.clone()
    };
    Reply::embed(page).with_row(row)
}

fn controls(owner: &str) -> ActionRow {
    ActionRow::new([
        Button::new(
            ButtonToken::render(Navigation::Left.action(), Some(owner)),
            ButtonStyle::Primary,
        )
        .emoji(emojis::LEFT),
        Button::new(
            ButtonToken::render(Navigation::Right.action(), Some(owner)),
            ButtonStyle::Primary,
        )
        .emoji(emojis::RIGHT),
    ])
}

struct Session {
    runtime: Arc<RuntimeContext>,
    message: MessageRef,
    owner: String,
    pages: Vec<Embed>,
    state: PaginationState,
    controls: ActionRow,
    timeout: Duration,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl Session {
    fn render(&self, disabled: bool) -> Reply {
        render(&self.pages, &self.state, &self.controls, disabled)
    }

    async fn run(mut self, mut signals: mpsc::Receiver<SessionSignal>, deadline: Instant) {
        let shutdown = self.runtime.shutdown_token().clone();
        let idle = time::sleep_until(deadline);
        tokio::pin!(idle);

        debug!("Pagination session started");

        let reason = loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break EndReason::Shutdown,
                signal = signals.recv() => match signal {
                    Some(SessionSignal::Press(press)) => {
                        if self.handle_press(press).await {
                            idle.as_mut().reset(Instant::now() + self.timeout);
                        }
                    }
                    Some(SessionSignal::HostDeleted) => break EndReason::HostDeleted,
                    None => break EndReason::Shutdown,
                },
                () = &mut idle => break EndReason::IdleTimeout,
            }
        };

        self.runtime.sessions().remove(&self.message.message_id);

        if reason == EndReason::IdleTimeout {
            let reply = self.render(true);
            if let Err(e) = self
                .runtime
                .gateway()
                .edit_message(&self.message, reply)
                .await
            {
                warn!(error = %e, "Failed to disable pagination controls");
            }
        }

        debug!(reason = ?reason, "Pagination session ended");
        self.snapshot
            .send_modify(|s| s.state = SessionState::Ended(reason));
    }

    /// Returns `true` if the press was an accepted navigation.
    async fn handle_press(&mut self, press: ButtonPress) -> bool {
        let gateway = self.runtime.gateway();

        if press.actor.id != self.owner {
            debug!(actor = %press.actor.id, "Rejected navigation from non-owner");
            let origin = Origin::Interaction(press.interaction.clone());
            if let Err(e) = gateway.respond(&origin, denial_reply(&press.actor)).await {
                warn!(error = %e, "Failed to send denial notice");
            }
            self.snapshot.send_modify(|s| s.denials += 1);
            return false;
        }

        let Some(navigation) =
            ButtonToken::parse(&press.token).and_then(|t| Navigation::from_action(t.action()))
        else {
            trace!(token = %press.token, "Ignoring unknown action on paginated message");
            return false;
        };

        let index = self.state.navigate(navigation);
        trace!(index, "Navigated");

        if let Err(e) = gateway.edit_message(&self.message, self.render(false)).await {
            warn!(error = %e, "Failed to render page");
        }

        self.snapshot.send_modify(|s| {
            s.state = SessionState::Active(index);
            s.navigations += 1;
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Trigger;
    use crate::testing::{GatewayCall, RecordingGateway, button_press, command};

    #[test]
    fn test_navigation_wraps() {
        let mut state = PaginationState::at(2, 5);
        assert_eq!(state.navigate(Navigation::Left), 1);

        let mut state = PaginationState::at(0, 5);
        assert_eq!(state.navigate(Navigation::Left), 4);
        assert_eq!(state.navigate(Navigation::Right), 0);

        let mut single = PaginationState::new(1);
        assert_eq!(single.navigate(Navigation::Right), 0);
        assert_eq!(single.navigate(Navigation::Left), 0);
    }

    #[test]
    fn test_footer_is_one_based() {
        assert_eq!(PaginationState::at(2, 5).footer(), "Page 3 / 5");
        assert_eq!(PaginationState::new(1).footer(), "Page 1 / 1");
    }

    fn pages(n: usize) -> Vec<Embed> {
        (0..n).map(|i| Embed::new().title(format!("p{i}"))).collect()
    }

    async fn start(gateway: &Arc<RecordingGateway>, n: usize) -> (Arc<RuntimeContext>, SessionHandle) {
        let runtime = RuntimeContext::builder(gateway.clone()).build();
        let ctx = InvocationContext::new(
            runtime.clone(),
            Trigger::Command(command("bookmark", &[], "owner")),
        );
        let handle = paginate(&ctx, pages(n)).await.unwrap();
        (runtime, handle)
    }

    async fn press(runtime: &RuntimeContext, handle: &SessionHandle, token: &str, actor: &str) {
        let sender = runtime
            .sessions()
            .sender(&handle.message().message_id)
            .unwrap();
        let press = button_press(token, actor, &handle.message().message_id);
        sender.send(SessionSignal::Press(press)).await.unwrap();
    }

    fn rendered_titles(gateway: &RecordingGateway) -> Vec<(String, bool)> {
        gateway
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Respond { reply, .. } | GatewayCall::Edit { reply, .. }
                    if !reply.components.is_empty() =>
                {
                    let embed = &reply.embeds[0];
                    Some((
                        embed.footer.as_ref().unwrap().text.clone(),
                        reply.components[0].buttons.iter().all(|b| b.disabled),
                    ))
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_page_sent_with_owner_controls() {
        let gateway = RecordingGateway::new();
        let (runtime, handle) = start(&gateway, 3).await;

        assert_eq!(handle.state(), SessionState::Active(0));
        assert!(runtime.sessions().contains(&handle.message().message_id));

        let replies = gateway.responses();
        assert_eq!(replies.len(), 1);
        let ids: Vec<_> = replies[0].components[0]
            .buttons
            .iter()
            .map(|b| b.custom_id.as_str())
            .collect();
        assert_eq!(ids, ["left-owner", "right-owner"]);
        assert_eq!(
            replies[0].embeds[0].footer.as_ref().unwrap().text,
            "Page 1 / 3"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_owner_navigation_rerenders() {
        let gateway = RecordingGateway::new();
        let (runtime, mut handle) = start(&gateway, 3).await;

        press(&runtime, &handle, "left-owner", "owner").await;
        let snapshot = handle.wait_for(|s| s.navigations == 1).await;
        assert_eq!(snapshot.state, SessionState::Active(2));

        press(&runtime, &handle, "right-owner", "owner").await;
        let snapshot = handle.wait_for(|s| s.navigations == 2).await;
        assert_eq!(snapshot.state, SessionState::Active(0));

        assert_eq!(
            rendered_titles(&gateway),
            [
                ("Page 1 / 3".to_string(), false),
                ("Page 3 / 3".to_string(), false),
                ("Page 1 / 3".to_string(), false),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_owner_gets_one_denial_and_state_is_unchanged() {
        let gateway = RecordingGateway::new();
        let (runtime, mut handle) = start(&gateway, 5).await;

        press(&runtime, &handle, "right-owner", "owner").await;
        handle.wait_for(|s| s.navigations == 1).await;

        press(&runtime, &handle, "right-owner", "intruder").await;
        let snapshot = handle.wait_for(|s| s.denials == 1).await;
        assert_eq!(snapshot.state, SessionState::Active(1));
        assert_eq!(snapshot.navigations, 1);

        let denials: Vec<_> = gateway
            .responses()
            .into_iter()
            .filter(|r| r.is_ephemeral())
            .collect();
        assert_eq!(denials.len(), 1);
        assert_eq!(
            denials[0].embeds[0].description.as_deref(),
            Some("You cannot use this button!")
        );
        assert_eq!(gateway.edits().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_action_is_ignored() {
        let gateway = RecordingGateway::new();
        let (runtime, mut handle) = start(&gateway, 2).await;

        press(&runtime, &handle, "delete-owner", "owner").await;
        press(&runtime, &handle, "right-owner", "owner").await;
        let snapshot = handle.wait_for(|s| s.navigations == 1).await;
        assert_eq!(snapshot.state, SessionState::Active(1));
        assert_eq!(gateway.edits().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_disables_controls() {
        let gateway = RecordingGateway::new();
        let (runtime, mut handle) = start(&gateway, 2).await;

        time::advance(Duration::from_millis(119_999)).await;
        tokio::task::yield_now().await;
        assert_eq!(handle.state(), SessionState::Active(0));

        assert_eq!(handle.ended().await, Some(EndReason::IdleTimeout));
        assert!(!runtime.sessions().contains(&handle.message().message_id));

        let edits = gateway.edits();
        assert_eq!(edits.len(), 1);
        let (message, reply) = &edits[0];
        assert_eq!(message, handle.message());
        assert!(reply.components[0].buttons.iter().all(|b| b.disabled));
        assert_eq!(
            reply.embeds[0].footer.as_ref().unwrap().text,
            "Page 1 / 2"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_slides_the_deadline() {
        let gateway = RecordingGateway::new();
        let started = Instant::now();
        let (runtime, mut handle) = start(&gateway, 2).await;

        time::advance(Duration::from_secs(60)).await;
        press(&runtime, &handle, "right-owner", "owner").await;
        handle.wait_for(|s| s.navigations == 1).await;

        // 160s after start, 100s after the last navigation.
        time::advance(Duration::from_secs(100)).await;
        tokio::task::yield_now().await;
        assert_eq!(handle.state(), SessionState::Active(1));

        assert_eq!(handle.ended().await, Some(EndReason::IdleTimeout));
        assert!(started.elapsed() >= Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn test_denial_does_not_slide_the_deadline() {
        let gateway = RecordingGateway::new();
        let started = Instant::now();
        let (runtime, mut handle) = start(&gateway, 2).await;

        time::advance(Duration::from_secs(100)).await;
        press(&runtime, &handle, "right-owner", "intruder").await;
        handle.wait_for(|s| s.denials == 1).await;

        time::advance(Duration::from_secs(20)).await;
        assert_eq!(handle.ended().await, Some(EndReason::IdleTimeout));
        assert!(started.elapsed() < Duration::from_secs(121));
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_deleted_ends_without_render() {
        let gateway = RecordingGateway::new();
        let (runtime, mut handle) = start(&gateway, 2).await;

        let sender = runtime
            .sessions()
            .sender(&handle.message().message_id)
            .unwrap();
        sender.send(SessionSignal::HostDeleted).await.unwrap();

        assert_eq!(handle.ended().await, Some(EndReason::HostDeleted));
        assert!(gateway.edits().is_empty());
        assert!(runtime.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_ends_without_render() {
        let gateway = RecordingGateway::new();
        let (runtime, mut handle) = start(&gateway, 2).await;

        runtime.shutdown_token().cancel();
        assert_eq!(handle.ended().await, Some(EndReason::Shutdown));
        assert!(gateway.edits().is_empty());
    }

    #[tokio::test]
    async fn test_empty_pages_rejected() {
        let gateway = RecordingGateway::new();
        let runtime = RuntimeContext::builder(gateway.clone()).build();
        let ctx = InvocationContext::new(
            runtime,
            Trigger::Command(command("help", &[], "owner")),
        );
        assert!(paginate(&ctx, Vec::new()).await.is_err());
        assert!(gateway.calls().is_empty());
    }
}
