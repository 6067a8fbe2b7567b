//! The chat controller: echoes the user's text, sends it, renders the reply.
//!
//! At most one request is outstanding. The in-flight flag and the view share
//! one mutex, which is released before the request is awaited, so a second
//! `submit` arriving meanwhile sees the flag and returns straight away.

use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::message::{Kind, Message};
use crate::transport::{Transport, TransportError};
use crate::view::ChatView;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientState {
    pub awaiting_response: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing left after trimming.
    Empty,
    /// A previous request has not settled yet.
    Busy,
}

/// What a call to [`ChatClient::submit`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Ignored(IgnoreReason),
    Answered(Kind),
    Failed(TransportError),
}

struct Inner<V> {
    state: ClientState,
    view: V,
}

pub struct ChatClient<T, V> {
    transport: T,
    inner: Mutex<Inner<V>>,
}

impl<T: Transport, V: ChatView> ChatClient<T, V> {
    pub fn new(transport: T, view: V) -> Self {
        Self {
            transport,
            inner: Mutex::new(Inner {
                state: ClientState::default(),
                view,
            }),
        }
    }

    pub fn state(&self) -> ClientState {
        self.lock().state
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.state().awaiting_response
    }

    /// Runs `f` against the current view, e.g. to render it.
    pub fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.lock().view)
    }

    /// Puts the cursor back in the input, e.g. after an ignored submission.
    pub fn focus_input(&self) {
        self.lock().view.focus_input();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[instrument(skip(self, text))]
    pub async fn submit(&self, text: &str) -> Submission {
        match Self::begin(self, text) {
            Ok(pending) => Self::complete(pending).await,
            Err(reason) => Submission::Ignored(reason),
        }
    }

    /// Echoes the user's text right away and finishes the request on a
    /// background task. Returns the reason when the submission is ignored.
    pub fn spawn_submit(
        self: &Arc<Self>,
        text: &str,
    ) -> Result<JoinHandle<Submission>, IgnoreReason>
    where
        T: 'static,
        V: 'static,
    {
        let pending = Self::begin(Arc::clone(self), text)?;
        Ok(tokio::spawn(Self::complete(pending)))
    }

    /// Checks the preconditions, then renders the user bubble and the
    /// loading placeholder and marks the client busy. The returned guard
    /// settles the client if it is dropped before the request completes.
    fn begin<C>(client: C, text: &str) -> Result<Pending<C>, IgnoreReason>
    where
        C: Deref<Target = Self>,
    {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty submission");
            return Err(IgnoreReason::Empty);
        }

        {
            let mut guard = client.lock();
            if guard.state.awaiting_response {
                debug!("Ignoring submission while a request is pending");
                // The draft stays in the input, as nothing was sent.
                guard.view.set_input(text);
                return Err(IgnoreReason::Busy);
            }
            guard.state.awaiting_response = true;

            let view = &mut guard.view;
            view.hide_welcome();
            view.append(&Message::user(text));
            view.clear_input();
            view.show_loading();
            view.set_submit_enabled(false);
            view.scroll_to_bottom();
        }

        Ok(Pending {
            text: text.to_string(),
            in_flight: InFlight { client, done: false },
        })
    }

    async fn complete<C>(mut pending: Pending<C>) -> Submission
    where
        C: Deref<Target = Self>,
    {
        let client = &*pending.in_flight.client;

        info!("Sending message");
        let result = client.transport.send(&pending.text).await;

        let mut guard = client.lock();
        let view = &mut guard.view;
        view.remove_loading();
        let outcome = match result {
            Ok(reply) => {
                let kind = reply.kind();
                view.append(&Message::bot(reply.text_or_fallback(), kind));
                info!(kind = kind.as_str(), "Reply rendered");
                Submission::Answered(kind)
            }
            Err(err) => {
                warn!(error = %err, "Request failed");
                view.append(&Message::error(err.reply_text()));
                Submission::Failed(err)
            }
        };
        settle(&mut guard);
        drop(guard);
        pending.in_flight.done = true;
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn settle<V: ChatView>(inner: &mut Inner<V>) {
    inner.view.scroll_to_bottom();
    inner.state.awaiting_response = false;
    inner.view.set_submit_enabled(true);
    inner.view.focus_input();
}

/// An accepted submission that has not settled yet.
struct Pending<C: Deref>
where
    C::Target: Abandon,
{
    text: String,
    in_flight: InFlight<C>,
}

trait Abandon {
    fn abandon(&self);
}

impl<T: Transport, V: ChatView> Abandon for ChatClient<T, V> {
    /// Clears the placeholder and settles after an abandoned request.
    fn abandon(&self) {
        warn!("Request abandoned before it settled");
        let mut guard = self.lock();
        guard.view.remove_loading();
        settle(&mut guard);
    }
}

struct InFlight<C: Deref>
where
    C::Target: Abandon,
{
    client: C,
    done: bool,
}

impl<C: Deref> Drop for InFlight<C>
where
    C::Target: Abandon,
{
    fn drop(&mut self) {
        if !self.done {
            self.client.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FALLBACK_REPLY, TIMEOUT_REPLY};
    use crate::transport::ReplyPayload;
    use crate::view::HtmlView;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        reply: Result<ReplyPayload, TransportError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(reply: Result<ReplyPayload, TransportError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Transport for Scripted {
        async fn send(&self, _text: &str) -> Result<ReplyPayload, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    /// Never resolves, so the request stays in flight.
    struct Stalled;

    impl Transport for Stalled {
        async fn send(&self, _text: &str) -> Result<ReplyPayload, TransportError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_whitespace_is_ignored() {
        let client = ChatClient::new(Scripted::new(Ok(ReplyPayload::default())), HtmlView::new());
        assert_eq!(client.submit("   \n\t").await, Submission::Ignored(IgnoreReason::Empty));
        assert_eq!(client.transport().calls.load(Ordering::SeqCst), 0);
        client.with_view(|view| {
            assert!(view.bubbles().is_empty());
            assert!(view.is_welcome_visible());
        });
    }

    #[tokio::test]
    async fn test_success_renders_reply() {
        let client = ChatClient::new(Scripted::new(Ok(ReplyPayload::new("hi", Kind::Qa))), HtmlView::new());
        assert_eq!(client.submit("  hello  ").await, Submission::Answered(Kind::Qa));
        client.with_view(|view| {
            assert_eq!(view.bubbles().len(), 2);
            assert!(view.bubbles()[0].contains("hello"));
            assert!(view.bubbles()[1].contains("hi"));
            assert!(!view.bubbles()[1].contains("message-error"));
            assert!(!view.is_loading());
            assert!(!view.is_welcome_visible());
        });
    }

    #[tokio::test]
    async fn test_missing_text_uses_fallback() {
        let client = ChatClient::new(Scripted::new(Ok(ReplyPayload::default())), HtmlView::new());
        client.submit("question").await;
        client.with_view(|view| assert!(view.bubbles()[1].contains(FALLBACK_REPLY)));
    }

    #[tokio::test]
    async fn test_failure_settles_client() {
        let client = ChatClient::new(Scripted::new(Err(TransportError::Timeout)), HtmlView::new());
        assert_eq!(client.submit("question").await, Submission::Failed(TransportError::Timeout));
        assert!(!client.is_awaiting_response());
        client.with_view(|view| {
            assert!(view.bubbles()[1].contains(TIMEOUT_REPLY));
            assert!(view.bubbles()[1].contains("message-error"));
            assert!(view.is_submit_enabled());
            assert!(view.is_input_focused());
        });
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_ignored() {
        let client = ChatClient::new(Stalled, HtmlView::new());
        let first = client.submit("one");
        tokio::pin!(first);
        // Drive the first submission up to its await point.
        assert!(poll_briefly(first.as_mut()).await.is_none());
        assert!(client.is_awaiting_response());

        assert_eq!(client.submit("two").await, Submission::Ignored(IgnoreReason::Busy));
        client.with_view(|view| {
            assert_eq!(view.bubbles().len(), 1);
            assert!(view.is_loading());
            assert!(!view.is_submit_enabled());
        });
    }

    #[tokio::test]
    async fn test_dropped_request_still_settles() {
        let client = ChatClient::new(Stalled, HtmlView::new());
        {
            let first = client.submit("one");
            tokio::pin!(first);
            assert!(poll_briefly(first.as_mut()).await.is_none());
        }
        assert!(!client.is_awaiting_response());
        client.with_view(|view| {
            assert!(!view.is_loading());
            assert!(view.is_submit_enabled());
            assert!(view.is_input_focused());
        });
    }

    #[tokio::test]
    async fn test_spawn_submit_echoes_before_reply() {
        let client = Arc::new(ChatClient::new(Stalled, HtmlView::new()));
        let handle = client.spawn_submit("one").unwrap();
        client.with_view(|view| {
            assert_eq!(view.bubbles().len(), 1);
            assert!(view.is_loading());
        });
        assert_eq!(client.spawn_submit("two").unwrap_err(), IgnoreReason::Busy);
        assert_eq!(client.spawn_submit(" ").unwrap_err(), IgnoreReason::Empty);
        handle.abort();
    }

    #[tokio::test]
    async fn test_aborted_spawn_settles_before_first_poll() {
        let client = Arc::new(ChatClient::new(Stalled, HtmlView::new()));
        let handle = client.spawn_submit("one").unwrap();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        assert!(!client.is_awaiting_response());
        client.with_view(|view| {
            assert!(!view.is_loading());
            assert!(view.is_submit_enabled());
            assert!(view.is_input_focused());
        });

        let next = client.spawn_submit("two").unwrap();
        next.abort();
    }

    #[tokio::test]
    async fn test_busy_submission_keeps_draft() {
        let client = Arc::new(ChatClient::new(Stalled, HtmlView::new()));
        let handle = client.spawn_submit("one").unwrap();
        assert_eq!(client.submit("  two  ").await, Submission::Ignored(IgnoreReason::Busy));
        client.with_view(|view| {
            assert_eq!(view.input_value(), "two");
            assert_eq!(view.bubbles().len(), 1);
        });
        handle.abort();
    }

    async fn poll_briefly<F: std::future::Future + Unpin>(fut: F) -> Option<F::Output> {
        tokio::time::timeout(std::time::Duration::from_millis(10), fut).await.ok()
    }
}
