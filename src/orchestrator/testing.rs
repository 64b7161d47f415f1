//! Mock relay and orchestrator integration tests

use super::*;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// Mock relay that returns queued replies and records every request.
///
/// When gated, each call parks until [`MockRelay::release`] is called, which
/// lets tests observe the in-flight window.
pub struct MockRelay {
    replies: Mutex<VecDeque<Result<Message, RelayFailure>>>,
    /// Record of all histories sent
    pub requests: Mutex<Vec<Vec<Message>>>,
    gated: bool,
    gate: Notify,
    entered: Notify,
}

impl MockRelay {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gated: false,
            gate: Notify::new(),
            entered: Notify::new(),
        }
    }

    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::new()
        }
    }

    pub fn queue_reply(&self, reply: Message) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_failure(&self, failure: RelayFailure) {
        self.replies.lock().unwrap().push_back(Err(failure));
    }

    pub fn recorded_requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until a call has reached the relay
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let one parked call proceed
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

impl Default for MockRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayClient for MockRelay {
    async fn send(&self, input: &[Message]) -> Result<Message, RelayFailure> {
        self.requests.lock().unwrap().push(input.to_vec());
        self.entered.notify_one();
        if self.gated {
            self.gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RelayFailure::Transport("No mock reply queued".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::GREETING;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn setup(relay: MockRelay) -> (Orchestrator, Arc<MockRelay>, Arc<Conversation>) {
        let relay = Arc::new(relay);
        let orchestrator = Orchestrator::new(relay.clone(), TIMEOUT);
        let conversation = Arc::new(Conversation::with_state(
            "test-conv",
            crate::conversation::ConversationState::with_greeting("greeting"),
        ));
        (orchestrator, relay, conversation)
    }

    async fn roles(conversation: &Conversation) -> Vec<Role> {
        conversation
            .state
            .lock()
            .await
            .messages()
            .iter()
            .map(Message::role)
            .collect()
    }

    /// Successful exchange appends user then assistant
    #[tokio::test]
    async fn test_successful_exchange() {
        let (orch, relay, conv) = setup(MockRelay::new());
        relay.queue_reply(Message::assistant("Tokyo highlights..."));

        let reply = orch.submit(conv.clone(), "Tell me about Tokyo").await.unwrap();
        assert_eq!(reply, Message::assistant("Tokyo highlights..."));

        assert_eq!(
            roles(&conv).await,
            vec![Role::Assistant, Role::User, Role::Assistant]
        );
        let state = conv.state.lock().await;
        assert!(!state.is_awaiting_response());
        assert_eq!(state.messages()[1], Message::user("Tell me about Tokyo"));
        assert_eq!(state.messages()[2].content(), "Tokyo highlights...");
    }

    /// The relay sees the full history including the new user message
    #[tokio::test]
    async fn test_full_history_sent_once() {
        let (orch, relay, conv) = setup(MockRelay::new());
        relay.queue_reply(Message::assistant("first"));
        relay.queue_reply(Message::assistant("second"));

        orch.submit(conv.clone(), "one").await.unwrap();
        orch.submit(conv.clone(), "two").await.unwrap();

        let requests = relay.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1],
            vec![
                Message::assistant("greeting"),
                Message::user("one"),
                Message::assistant("first"),
                Message::user("two"),
            ]
        );
    }

    /// Empty input: no mutation, no call
    #[tokio::test]
    async fn test_empty_input_ignored() {
        let (orch, relay, conv) = setup(MockRelay::new());

        for text in ["", "   ", "\n"] {
            let err = orch.submit(conv.clone(), text).await.unwrap_err();
            assert_eq!(err, SubmitError::EmptyInput);
        }

        assert_eq!(conv.state.lock().await.len(), 1);
        assert!(relay.recorded_requests().is_empty());
    }

    /// Relay failure keeps the user message and clears the flag
    #[tokio::test]
    async fn test_failure_resets_awaiting() {
        let (orch, relay, conv) = setup(MockRelay::new());
        relay.queue_failure(RelayFailure::Status(500));

        let err = orch.submit(conv.clone(), "Tell me about Tokyo").await.unwrap_err();
        assert_eq!(err, SubmitError::Failed);

        assert_eq!(roles(&conv).await, vec![Role::Assistant, Role::User]);
        assert!(!conv.state.lock().await.is_awaiting_response());
    }

    /// After a failure an identical retry succeeds and appends one user and one assistant message
    #[tokio::test]
    async fn test_retry_after_failure() {
        let (orch, relay, conv) = setup(MockRelay::new());
        relay.queue_failure(RelayFailure::Transport("connection reset".to_string()));
        relay.queue_reply(Message::assistant("here you go"));

        assert!(orch.submit(conv.clone(), "hello").await.is_err());
        assert_eq!(conv.state.lock().await.len(), 2);

        orch.submit(conv.clone(), "hello").await.unwrap();
        assert_eq!(
            roles(&conv).await,
            vec![Role::Assistant, Role::User, Role::User, Role::Assistant]
        );
        assert!(!conv.state.lock().await.is_awaiting_response());
    }

    /// A reply that is not from the assistant counts as failure
    #[tokio::test]
    async fn test_wrong_role_is_failure() {
        let (orch, relay, conv) = setup(MockRelay::new());
        relay.queue_reply(Message::user("echo"));

        let err = orch.submit(conv.clone(), "hello").await.unwrap_err();
        assert_eq!(err, SubmitError::Failed);
        assert_eq!(conv.state.lock().await.len(), 2);
        assert!(!conv.state.lock().await.is_awaiting_response());
    }

    /// Second submit while in flight is rejected without a call
    #[tokio::test]
    async fn test_busy_rejected_while_in_flight() {
        let (orch, relay, conv) = setup(MockRelay::gated());
        relay.queue_reply(Message::assistant("done"));

        let first = {
            let orch = orch.clone();
            let conv = conv.clone();
            tokio::spawn(async move { orch.submit(conv, "first").await })
        };
        relay.wait_entered().await;

        assert!(conv.state.lock().await.is_awaiting_response());
        let err = orch.submit(conv.clone(), "second").await.unwrap_err();
        assert_eq!(err, SubmitError::Busy);
        assert_eq!(conv.state.lock().await.len(), 2);
        assert_eq!(relay.recorded_requests().len(), 1);

        relay.release();
        let reply = first.await.unwrap().unwrap();
        assert_eq!(reply.content(), "done");
        assert_eq!(conv.state.lock().await.len(), 3);
    }

    /// A relay that never answers hits the deadline and takes the failure path
    #[tokio::test]
    async fn test_timeout_is_failure() {
        let relay = Arc::new(MockRelay::gated());
        let orch = Orchestrator::new(relay.clone(), Duration::from_millis(50));
        let conv = Arc::new(Conversation::new("timeout-conv"));

        let err = orch.submit(conv.clone(), "hello").await.unwrap_err();
        assert_eq!(err, SubmitError::Failed);

        let state = conv.state.lock().await;
        assert_eq!(state.messages()[0].content(), GREETING);
        assert_eq!(state.len(), 2);
        assert!(!state.is_awaiting_response());
    }

    /// Dropping the caller mid-request still reconciles the conversation
    #[tokio::test]
    async fn test_dropped_caller_still_reconciles() {
        let (orch, relay, conv) = setup(MockRelay::gated());
        relay.queue_reply(Message::assistant("late reply"));

        let caller = {
            let orch = orch.clone();
            let conv = conv.clone();
            tokio::spawn(async move { orch.submit(conv, "hello").await })
        };
        relay.wait_entered().await;
        caller.abort();
        relay.release();

        let deadline = tokio::time::Instant::now() + TIMEOUT;
        loop {
            if !conv.state.lock().await.is_awaiting_response() {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "conversation stuck awaiting");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(conv.state.lock().await.len(), 3);
    }
}
