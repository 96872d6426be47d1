//! Scripted in-memory transport for tests
//!
//! Replies are consumed in order, one per `recv`. When the script runs dry
//! `recv` never completes, which lets callers exercise their timeout path.
//! Late replies model datagrams already sitting in the socket buffer: `recv`
//! returns them first and `drain` discards them.

use crate::transport::traits::{Transport, TransportConnector, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Shared {
    replies: VecDeque<String>,
    late: VecDeque<String>,
    sent: Vec<String>,
    connects: usize,
    closes: usize,
}

/// Connector handing out transports that share one script
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    shared: Arc<Mutex<Shared>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector whose device answers `replies` in order
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let connector = Self::new();
        connector.push_replies(replies);
        connector
    }

    pub fn push_replies<I, S>(&self, replies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut shared = self.shared.lock().unwrap();
        shared.replies.extend(replies.into_iter().map(Into::into));
    }

    /// Queue a reply that arrives after its exchange gave up
    pub fn push_late(&self, reply: impl Into<String>) {
        self.shared.lock().unwrap().late.push_back(reply.into());
    }

    /// Every command text sent so far, in order
    pub fn sent(&self) -> Vec<String> {
        self.shared.lock().unwrap().sent.clone()
    }

    pub fn connects(&self) -> usize {
        self.shared.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.shared.lock().unwrap().closes
    }
}

pub struct MockTransport {
    shared: Arc<Mutex<Shared>>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, datagram: &[u8]) -> Result<usize, TransportError> {
        let text = String::from_utf8_lossy(datagram).to_string();
        self.shared.lock().unwrap().sent.push(text);
        Ok(datagram.len())
    }

    async fn recv(&mut self) -> Result<Bytes, TransportError> {
        let next = {
            let mut shared = self.shared.lock().unwrap();
            shared.late.pop_front().or_else(|| shared.replies.pop_front())
        };
        match next {
            Some(reply) => Ok(Bytes::from(reply)),
            None => std::future::pending().await,
        }
    }

    async fn drain(&mut self) -> Result<Vec<Bytes>, TransportError> {
        let mut shared = self.shared.lock().unwrap();
        Ok(shared.late.drain(..).map(Bytes::from).collect())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.shared.lock().unwrap().closes += 1;
        Ok(())
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self) -> Result<Self::Transport, TransportError> {
        self.shared.lock().unwrap().connects += 1;
        Ok(MockTransport {
            shared: self.shared.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}
