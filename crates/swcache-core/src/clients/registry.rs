//! In-process client registry: id -> message channel + current controller.

use super::{ClientContext, ClientGone, ClientId, ClientMessage, Clients};
use crate::http::Request;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

struct Slot {
    sender: mpsc::UnboundedSender<ClientMessage>,
    controller: Option<String>,
}

/// Receiving end held by the page side of a client.
pub struct ClientReceiver {
    rx: mpsc::UnboundedReceiver<ClientMessage>,
}

impl ClientReceiver {
    /// Next message; None once the client is closed and drained.
    pub async fn recv(&mut self) -> Option<ClientMessage> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ClientMessage> {
        self.rx.try_recv().ok()
    }
}

struct ChannelClient {
    id: ClientId,
    sender: mpsc::UnboundedSender<ClientMessage>,
}

#[async_trait]
impl ClientContext for ChannelClient {
    fn id(&self) -> &ClientId {
        &self.id
    }

    async fn post_message(&self, message: ClientMessage) -> Result<(), ClientGone> {
        self.sender
            .send(message)
            .map_err(|_| ClientGone(self.id.clone()))
    }
}

/// Shared registry of open clients. Used by the host to stand in for pages.
#[derive(Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, Slot>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a client context (replacing any previous one with the same id).
    /// New clients start uncontrolled until a version claims them.
    pub fn open(&self, id: ClientId) -> ClientReceiver {
        let (sender, rx) = mpsc::unbounded_channel();
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Slot {
                    sender,
                    controller: None,
                },
            );
        ClientReceiver { rx }
    }

    pub fn close(&self, id: &ClientId) {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    pub fn controller_of(&self, id: &ClientId) -> Option<String> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .and_then(|slot| slot.controller.clone())
    }

}

#[async_trait]
impl Clients for ClientRegistry {
    async fn resolve_originating(&self, request: &Request) -> Option<Arc<dyn ClientContext>> {
        let id = request.resulting_client_id.as_ref()?;
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        let slot = clients.get(id)?;
        Some(Arc::new(ChannelClient {
            id: id.clone(),
            sender: slot.sender.clone(),
        }))
    }

    async fn claim(&self, controller: &str) -> usize {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        // Contexts whose page side went away are not open any more.
        clients.retain(|_, slot| !slot.sender.is_closed());
        let mut claimed = 0;
        for slot in clients.values_mut() {
            if slot.controller.as_deref() != Some(controller) {
                slot.controller = Some(controller.to_string());
                claimed += 1;
            }
        }
        claimed
    }
}
