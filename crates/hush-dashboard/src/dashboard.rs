use tracing::{debug, warn};
use uuid::Uuid;

use hush_types::api::ApiResponse;
use hush_types::models::Message;

use crate::ClientError;
use crate::backend::DashboardBackend;

/// Where the dashboard is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No signed-in user yet; nothing is fetched.
    LoadingSession,
    /// Settings and/or messages are being fetched.
    LoadingData,
    Idle,
    /// A preference update is in flight.
    MutatingSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    AcceptMessages,
    SafeMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub accepting_messages: bool,
    pub safe_mode: bool,
}

impl Settings {
    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::AcceptMessages => self.accepting_messages,
            Setting::SafeMode => self.safe_mode,
        }
    }

    fn set(&mut self, setting: Setting, value: bool) {
        match setting {
            Setting::AcceptMessages => self.accepting_messages = value,
            Setting::SafeMode => self.safe_mode = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

impl Toast {
    fn info(title: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            title: title.into(),
            description: description.map(str::to_string),
            variant: ToastVariant::Default,
        }
    }

    /// Error toast: the server's message when it sent one, else `fallback`.
    fn error(err: &ClientError, fallback: &str) -> Self {
        Self {
            title: "Error".to_string(),
            description: Some(err.server_message().unwrap_or(fallback).to_string()),
            variant: ToastVariant::Destructive,
        }
    }
}

/// The signed-in user, as far as the dashboard cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
}

/// View-model for the user dashboard.
///
/// Switches only change after the server confirms the update, so a failed
/// toggle leaves them as they were and only raises a toast.
pub struct Dashboard<B> {
    backend: B,
    session: Option<Session>,
    phase: Phase,
    settings: Settings,
    messages: Vec<Message>,
    toasts: Vec<Toast>,
}

impl<B: DashboardBackend> Dashboard<B> {
    pub fn new(backend: B, session: Option<Session>) -> Self {
        Self {
            backend,
            session,
            phase: Phase::LoadingSession,
            settings: Settings::default(),
            messages: Vec::new(),
            toasts: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Drain pending toasts for display.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Switches are disabled unless the dashboard is idle.
    pub fn switches_disabled(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Attach the session once it resolves. Call [`Dashboard::mount`] afterwards.
    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Initial load: messages and both settings, fetched concurrently. Does
    /// nothing until a session is present.
    pub async fn mount(&mut self) {
        if self.session.is_none() {
            self.phase = Phase::LoadingSession;
            return;
        }
        self.phase = Phase::LoadingData;

        let backend = &self.backend;
        let (messages, settings) = tokio::join!(backend.messages(), async {
            tokio::try_join!(backend.accept_messages(), backend.safe_mode())
        });

        self.apply_messages(messages, false);
        self.apply_settings(settings);
        self.phase = Phase::Idle;
    }

    /// Refetch the inbox (the "Refresh Messages" button).
    pub async fn refresh_messages(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::LoadingData;
        let result = self.backend.messages().await;
        self.apply_messages(result, true);
        self.phase = Phase::Idle;
    }

    /// Flip a preference on the server, then in the view.
    pub async fn toggle(&mut self, setting: Setting) {
        if self.switches_disabled() {
            debug!("Ignoring {:?} toggle in phase {:?}", setting, self.phase);
            return;
        }
        self.phase = Phase::MutatingSwitch;

        let value = !self.settings.get(setting);
        let result = match setting {
            Setting::AcceptMessages => self.backend.set_accept_messages(value).await,
            Setting::SafeMode => self.backend.set_safe_mode(value).await,
        };

        match result {
            Ok(resp) => {
                self.settings.set(setting, value);
                self.toasts.push(Toast::info(resp.message, None));
            }
            Err(e) => {
                warn!("Failed to update {:?}: {}", setting, e);
                self.toasts.push(Toast::error(&e, "Failed to update setting"));
            }
        }
        self.phase = Phase::Idle;
    }

    /// Drop a message from the rendered list. Purely local.
    pub fn remove_message(&mut self, id: Uuid) {
        self.messages.retain(|m| m.id != id);
    }

    /// Delete a message on the server, then remove it from the list.
    pub async fn delete_message(&mut self, id: Uuid) {
        if self.session.is_none() || self.phase != Phase::Idle {
            debug!("Ignoring delete of {} in phase {:?}", id, self.phase);
            return;
        }

        match self.backend.delete_message(id).await {
            Ok(resp) => {
                self.toasts.push(Toast::info(resp.message, None));
                self.remove_message(id);
            }
            Err(e) => {
                warn!("Failed to delete message {}: {}", id, e);
                self.toasts.push(Toast::error(&e, "Failed to delete message"));
            }
        }
    }

    /// Public link where others can send this user messages.
    pub fn profile_url(&self, origin: &str) -> Option<String> {
        let session = self.session.as_ref()?;
        Some(format!("{}/u/{}", origin.trim_end_matches('/'), session.username))
    }

    /// Returns the URL for the host to place on the clipboard.
    pub fn copy_profile_url(&mut self, origin: &str) -> Option<String> {
        let url = self.profile_url(origin)?;
        self.toasts.push(Toast::info(
            "URL Copied!",
            Some("Profile URL has been copied to clipboard"),
        ));
        Some(url)
    }

    fn apply_messages(&mut self, result: Result<ApiResponse, ClientError>, refresh: bool) {
        match result {
            Ok(resp) => {
                self.messages = resp.messages.unwrap_or_default();
                if refresh {
                    self.toasts.push(Toast::info(
                        "Refreshed Messages",
                        Some("Showing latest messages"),
                    ));
                }
            }
            Err(e) => {
                warn!("Failed to fetch messages: {}", e);
                self.toasts.push(Toast::error(&e, "Failed to fetch messages"));
            }
        }
    }

    /// Both settings are applied together or not at all.
    fn apply_settings(&mut self, result: Result<(ApiResponse, ApiResponse), ClientError>) {
        match result {
            Ok((accept, safe)) => {
                self.settings.accepting_messages = accept.is_accepting_messages.unwrap_or(false);
                self.settings.safe_mode = safe.safe_mode.unwrap_or(false);
            }
            Err(e) => {
                warn!("Failed to fetch settings: {}", e);
                self.toasts.push(Toast::error(&e, "Failed to fetch settings"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use futures_util::future::BoxFuture;

    use super::*;

    /// In-memory backend that counts every call.
    #[derive(Default)]
    struct StubBackend {
        accepting: Mutex<bool>,
        safe: Mutex<bool>,
        inbox: Mutex<Vec<Message>>,
        /// Fail the safe-mode read with this server message.
        safe_mode_read_error: Option<String>,
        /// Fail every write with this status.
        write_error: Option<u16>,
        calls: AtomicUsize,
    }

    impl StubBackend {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn ready<T: Send + 'static>(&self, value: T) -> BoxFuture<'_, T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { value })
        }

        fn write_result(&self, message: &str) -> Result<ApiResponse, ClientError> {
            match self.write_error {
                Some(status) => Err(ClientError::Api { status, message: None }),
                None => Ok(ApiResponse::ok(message)),
            }
        }
    }

    impl DashboardBackend for &StubBackend {
        fn accept_messages(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
            let mut resp = ApiResponse::ok("ok");
            resp.is_accepting_messages = Some(*self.accepting.lock().unwrap());
            self.ready(Ok(resp))
        }

        fn set_accept_messages(&self, value: bool) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
            let result = self.write_result("Message acceptance status updated successfully");
            if result.is_ok() {
                *self.accepting.lock().unwrap() = value;
            }
            self.ready(result)
        }

        fn safe_mode(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
            let result = match &self.safe_mode_read_error {
                Some(message) => Err(ClientError::Api { status: 500, message: Some(message.clone()) }),
                None => {
                    // Older servers omit the field entirely when it is off
                    let mut resp = ApiResponse::ok("ok");
                    if *self.safe.lock().unwrap() {
                        resp.safe_mode = Some(true);
                    }
                    Ok(resp)
                }
            };
            self.ready(result)
        }

        fn set_safe_mode(&self, value: bool) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
            let result = self.write_result("Safe mode updated successfully");
            if result.is_ok() {
                *self.safe.lock().unwrap() = value;
            }
            self.ready(result)
        }

        fn messages(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
            let mut resp = ApiResponse::ok("ok");
            resp.messages = Some(self.inbox.lock().unwrap().clone());
            self.ready(Ok(resp))
        }

        fn delete_message(&self, id: Uuid) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
            let mut inbox = self.inbox.lock().unwrap();
            let before = inbox.len();
            inbox.retain(|m| m.id != id);
            let result = if inbox.len() < before {
                Ok(ApiResponse::ok("Message deleted"))
            } else {
                Err(ClientError::Api {
                    status: 404,
                    message: Some("Message not found or already deleted".into()),
                })
            };
            drop(inbox);
            self.ready(result)
        }
    }

    fn message(content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    fn alice() -> Option<Session> {
        Some(Session { username: "alice".into() })
    }

    #[tokio::test]
    async fn no_session_no_requests() {
        let backend = StubBackend::default();
        let mut dash = Dashboard::new(&backend, None);

        dash.mount().await;
        dash.toggle(Setting::SafeMode).await;

        assert_eq!(dash.phase(), Phase::LoadingSession);
        assert!(dash.switches_disabled());
        assert_eq!(backend.calls(), 0);
        assert_eq!(dash.profile_url("https://hush.example"), None);
    }

    #[tokio::test]
    async fn delete_waits_for_idle() {
        let first = message("hi");
        let backend = StubBackend {
            inbox: Mutex::new(vec![first.clone()]),
            ..Default::default()
        };

        let mut dash = Dashboard::new(&backend, None);
        dash.delete_message(first.id).await;
        assert_eq!(backend.calls(), 0);

        // Session known but data not loaded yet
        dash.set_session(Session { username: "alice".into() });
        dash.delete_message(first.id).await;
        assert_eq!(backend.calls(), 0);
        assert_eq!(backend.inbox.lock().unwrap().len(), 1);
        assert!(dash.take_toasts().is_empty());

        dash.mount().await;
        dash.delete_message(first.id).await;
        assert!(backend.inbox.lock().unwrap().is_empty());
        assert!(dash.messages().is_empty());
    }

    #[tokio::test]
    async fn mount_loads_settings_and_messages() {
        let backend = StubBackend {
            accepting: Mutex::new(true),
            safe: Mutex::new(true),
            inbox: Mutex::new(vec![message("hi"), message("hello")]),
            ..Default::default()
        };
        let mut dash = Dashboard::new(&backend, alice());

        dash.mount().await;

        assert_eq!(dash.phase(), Phase::Idle);
        assert!(!dash.switches_disabled());
        assert_eq!(dash.settings(), Settings { accepting_messages: true, safe_mode: true });
        assert_eq!(dash.messages().len(), 2);
        assert_eq!(backend.calls(), 3);
        assert!(dash.toasts().is_empty());
    }

    #[tokio::test]
    async fn absent_safe_mode_reads_as_off() {
        let backend = StubBackend::default();
        let mut dash = Dashboard::new(&backend, alice());
        dash.mount().await;
        assert!(!dash.settings().safe_mode);
    }

    #[tokio::test]
    async fn settings_fetch_failure_applies_nothing() {
        let backend = StubBackend {
            accepting: Mutex::new(true),
            safe_mode_read_error: Some("Error retrieving safe mode status".into()),
            inbox: Mutex::new(vec![message("hi")]),
            ..Default::default()
        };
        let mut dash = Dashboard::new(&backend, alice());

        dash.mount().await;

        // Accept-messages succeeded but is not applied on its own
        assert_eq!(dash.settings(), Settings::default());
        assert_eq!(dash.messages().len(), 1);
        assert_eq!(
            dash.take_toasts(),
            vec![Toast {
                title: "Error".into(),
                description: Some("Error retrieving safe mode status".into()),
                variant: ToastVariant::Destructive,
            }]
        );
        assert_eq!(dash.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn toggle_applies_after_server_confirms() {
        let backend = StubBackend::default();
        let mut dash = Dashboard::new(&backend, alice());
        dash.mount().await;

        dash.toggle(Setting::SafeMode).await;
        assert!(dash.settings().safe_mode);
        assert!(*backend.safe.lock().unwrap());
        assert_eq!(dash.take_toasts()[0].title, "Safe mode updated successfully");

        dash.toggle(Setting::AcceptMessages).await;
        assert!(dash.settings().accepting_messages);
        assert!(dash.settings().safe_mode);

        dash.toggle(Setting::SafeMode).await;
        assert!(!dash.settings().safe_mode);
        assert_eq!(dash.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn failed_toggle_leaves_switch_unchanged() {
        let backend = StubBackend {
            write_error: Some(500),
            ..Default::default()
        };
        let mut dash = Dashboard::new(&backend, alice());
        dash.mount().await;

        dash.toggle(Setting::AcceptMessages).await;

        assert!(!dash.settings().accepting_messages);
        let toasts = dash.take_toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].variant, ToastVariant::Destructive);
        assert_eq!(toasts[0].description.as_deref(), Some("Failed to update setting"));
        assert_eq!(dash.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn remove_message_is_local() {
        let first = message("first");
        let backend = StubBackend {
            inbox: Mutex::new(vec![first.clone(), message("second")]),
            ..Default::default()
        };
        let mut dash = Dashboard::new(&backend, alice());
        dash.mount().await;
        let calls = backend.calls();

        dash.remove_message(first.id);

        assert_eq!(backend.calls(), calls);
        assert_eq!(dash.messages().len(), 1);
        assert_eq!(dash.messages()[0].content, "second");
        // Still on the server
        assert_eq!(backend.inbox.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_message_hits_server_then_list() {
        let first = message("first");
        let backend = StubBackend {
            inbox: Mutex::new(vec![first.clone(), message("second")]),
            ..Default::default()
        };
        let mut dash = Dashboard::new(&backend, alice());
        dash.mount().await;

        dash.delete_message(first.id).await;
        assert_eq!(dash.messages().len(), 1);
        assert_eq!(backend.inbox.lock().unwrap().len(), 1);
        assert_eq!(dash.take_toasts()[0].title, "Message deleted");

        // Unknown id: nothing removed, error surfaced
        dash.delete_message(Uuid::new_v4()).await;
        assert_eq!(dash.messages().len(), 1);
        assert_eq!(
            dash.take_toasts()[0].description.as_deref(),
            Some("Message not found or already deleted")
        );
    }

    #[tokio::test]
    async fn refresh_replaces_list_and_toasts() {
        let backend = StubBackend::default();
        let mut dash = Dashboard::new(&backend, alice());
        dash.mount().await;
        assert!(dash.messages().is_empty());

        backend.inbox.lock().unwrap().push(message("new"));
        dash.refresh_messages().await;

        assert_eq!(dash.messages().len(), 1);
        assert_eq!(
            dash.take_toasts(),
            vec![Toast {
                title: "Refreshed Messages".into(),
                description: Some("Showing latest messages".into()),
                variant: ToastVariant::Default,
            }]
        );
    }

    #[tokio::test]
    async fn late_session_then_mount() {
        let backend = StubBackend::default();
        let mut dash = Dashboard::new(&backend, None);
        dash.mount().await;
        assert_eq!(backend.calls(), 0);

        dash.set_session(Session { username: "alice".into() });
        dash.mount().await;
        assert_eq!(dash.phase(), Phase::Idle);
        assert_eq!(backend.calls(), 3);
    }

    #[test]
    fn profile_url_and_copy_toast() {
        let backend = StubBackend::default();
        let mut dash = Dashboard::new(&backend, alice());

        assert_eq!(
            dash.copy_profile_url("https://hush.example/").as_deref(),
            Some("https://hush.example/u/alice")
        );
        assert_eq!(dash.toasts()[0].title, "URL Copied!");
    }
}
