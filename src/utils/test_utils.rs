use crate::core::conversation::ConversationHandler;
use crate::core::message::Message;
use crate::core::provider::{Provider, ProviderError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a [`ScriptedProvider`] does when asked for a completion.
#[derive(Clone, Debug)]
pub enum Script {
    /// Emit these fragments in order (streaming) or their concatenation
    /// (batched).
    Fragments(Vec<String>),
    /// Fail every call with a stream error carrying this text.
    Fail(String),
    /// Emit these fragments, then fail.
    FailAfter(Vec<String>, String),
    /// Never answer.
    Hang,
}

/// A provider stub that follows a fixed script and records how it was
/// called.
pub struct ScriptedProvider {
    script: Script,
    pub generate_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
    seen_history: Mutex<Vec<Vec<Message>>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            generate_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            seen_history: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(fragments: &[&str]) -> Arc<Self> {
        Self::new(Script::Fragments(
            fragments.iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(Script::Fail(message.to_string()))
    }

    /// Histories received by each call, in call order.
    pub fn seen_history(&self) -> Vec<Vec<Message>> {
        self.seen_history.lock().unwrap().clone()
    }

    /// Cancellation tokens received by each call, in call order.
    pub fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().unwrap().clone()
    }

    fn record(&self, cancel: &CancellationToken, messages: &[Message]) {
        self.seen_history.lock().unwrap().push(messages.to_vec());
        self.tokens.lock().unwrap().push(cancel.clone());
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_completion(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
    ) -> Result<String, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.record(cancel, messages);
        match &self.script {
            Script::Fragments(fragments) => Ok(fragments.concat()),
            Script::Fail(message) | Script::FailAfter(_, message) => {
                Err(ProviderError::Stream(message.clone()))
            }
            Script::Hang => {
                std::future::pending::<()>().await;
                Err(ProviderError::Cancelled)
            }
        }
    }

    async fn stream_completion(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        sink: &mut (dyn Write + Send),
    ) -> Result<(), ProviderError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.record(cancel, messages);
        match &self.script {
            Script::Fragments(fragments) => {
                for fragment in fragments {
                    sink.write_all(fragment.as_bytes())
                        .map_err(ProviderError::Write)?;
                    tokio::task::yield_now().await;
                }
                sink.write_all(b"\n").map_err(ProviderError::Write)
            }
            Script::Fail(message) => Err(ProviderError::Stream(message.clone())),
            Script::FailAfter(fragments, message) => {
                for fragment in fragments {
                    sink.write_all(fragment.as_bytes())
                        .map_err(ProviderError::Write)?;
                }
                Err(ProviderError::Stream(message.clone()))
            }
            Script::Hang => {
                std::future::pending::<()>().await;
                Err(ProviderError::Cancelled)
            }
        }
    }
}

/// A cloneable in-memory terminal.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build a handler around `provider` that echoes into the returned buffer.
pub fn create_test_handler(provider: Arc<ScriptedProvider>) -> (ConversationHandler, SharedBuffer) {
    let terminal = SharedBuffer::new();
    let handler = ConversationHandler::new(provider)
        .with_terminal(Box::new(terminal.clone()))
        .with_request_timeout(Duration::from_secs(5));
    (handler, terminal)
}

fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Serializes environment mutation across tests and restores every touched
/// variable on drop.
pub struct TestEnvVarGuard {
    saved: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl TestEnvVarGuard {
    pub fn new() -> Self {
        Self {
            saved: Vec::new(),
            _lock: env_lock(),
        }
    }

    fn remember(&mut self, key: &str) {
        if !self.saved.iter().any(|(saved, _)| saved == key) {
            self.saved.push((key.to_string(), std::env::var_os(key)));
        }
    }

    pub fn set_var(&mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) {
        self.remember(key);
        std::env::set_var(key, value);
    }

    pub fn remove_var(&mut self, key: &str) {
        self.remember(key);
        std::env::remove_var(key);
    }
}

impl Drop for TestEnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..).rev() {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}
