//! Button correlation.
//!
//! Button custom ids are compound tokens of the form `action[-ownerId]`.
//! The action selects a [`ButtonBinding`]; the optional owner restricts who
//! may press the button.
//!
//! Parsing applies `^(.*?)(?:-([^-]+))?$`: everything after the last hyphen is
//! taken as the owner. An ownerless action that itself contains a hyphen is
//! therefore misread, e.g. `rotate-left` parses as action `rotate` with owner
//! `left`. Actions are named with underscores (`rotate_left`) to stay clear
//! of this.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use davinci_core::{Reply, User};

use crate::context::InvocationContext;
use crate::embed::error_reply;
use crate::handler::{BoxedButtonHandler, ButtonHandler};

static TOKEN_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(.*?)(?:-([^-]+))?$").ok());

/// Notice sent to a user who presses someone else's button.
pub const DENIAL_NOTICE: &str = "You cannot use this button!";

/// A parsed button custom id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ButtonToken {
    action: String,
    owner: Option<String>,
}

impl ButtonToken {
    pub fn new(action: impl Into<String>, owner: Option<String>) -> Self {
        Self {
            action: action.into(),
            owner,
        }
    }

    /// Parses a raw custom id. Returns `None` only for ids spanning lines.
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = TOKEN_PATTERN.as_ref()?.captures(raw)?;
        let action = captures.get(1).map_or("", |m| m.as_str());
        let owner = captures.get(2).map(|m| m.as_str().to_string());
        Some(Self::new(action, owner))
    }

    /// Builds a raw custom id.
    pub fn render(action: &str, owner: Option<&str>) -> String {
        match owner {
            Some(owner) => format!("{action}-{owner}"),
            None => action.to_string(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Whether `user_id` may press this button. Ownerless tokens are open.
    pub fn permits(&self, user_id: &str) -> bool {
        self.owner.as_deref().is_none_or(|owner| owner == user_id)
    }
}

impl std::fmt::Display for ButtonToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&Self::render(&self.action, self.owner()))
    }
}

/// Authorization predicate evaluated before a button handler runs.
pub type AuthorizeFn = Arc<dyn Fn(&InvocationContext) -> bool + Send + Sync>;

/// An action bound to a handler.
#[derive(Clone)]
pub struct ButtonBinding {
    action: String,
    handler: BoxedButtonHandler,
    authorize: Option<AuthorizeFn>,
}

impl ButtonBinding {
    pub fn new(action: impl Into<String>, handler: impl ButtonHandler) -> Self {
        Self {
            action: action.into(),
            handler: Arc::new(handler),
            authorize: None,
        }
    }

    /// Sets a custom authorization predicate.
    pub fn authorize<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&InvocationContext) -> bool + Send + Sync + 'static,
    {
        self.authorize = Some(Arc::new(predicate));
        self
    }

    /// Only the user named in the token's owner suffix may press the button.
    pub fn owner_only(self) -> Self {
        self.authorize(|ctx| {
            ctx.button_token()
                .is_none_or(|token| token.permits(&ctx.actor().id))
        })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn handler(&self) -> &BoxedButtonHandler {
        &self.handler
    }

    /// Runs the authorization predicate; bindings without one allow everyone.
    pub fn is_authorized(&self, ctx: &InvocationContext) -> bool {
        self.authorize.as_ref().is_none_or(|predicate| predicate(ctx))
    }
}

impl std::fmt::Debug for ButtonBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonBinding")
            .field("action", &self.action)
            .field("restricted", &self.authorize.is_some())
            .finish_non_exhaustive()
    }
}

/// Ordered button bindings. The first exact action match wins.
#[derive(Debug, Default, Clone)]
pub struct ButtonRouter {
    bindings: Vec<ButtonBinding>,
}

impl ButtonRouter {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn add(&mut self, binding: ButtonBinding) {
        self.bindings.push(binding);
    }

    pub fn with(mut self, binding: ButtonBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Finds the first binding for an action.
    pub fn find(&self, action: &str) -> Option<&ButtonBinding> {
        self.bindings.iter().find(|b| b.action == action)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// The ephemeral notice for an unauthorized press.
pub fn denial_reply(actor: &User) -> Reply {
    error_reply(actor, DENIAL_NOTICE)
}
