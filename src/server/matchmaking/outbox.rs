/// Outgoing messages produced while handling one event.
///
/// Lobby logic never touches sockets: it records deliveries here and the
/// matchmaking server actor flushes them once the state change is complete.
use super::messages::ServerEvent;
use super::types::ConnectionId;

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Send to exactly one connection.
    To(ConnectionId, ServerEvent),
    /// Send to every connection attached when the outbox is flushed.
    Broadcast(ServerEvent),
}

#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_to(&mut self, id: ConnectionId, event: ServerEvent) {
        self.deliveries.push(Delivery::To(id, event));
    }

    pub fn broadcast(&mut self, event: ServerEvent) {
        self.deliveries.push(Delivery::Broadcast(event));
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Delivery> {
        self.deliveries.drain(..)
    }

    /// Events addressed directly to `id`, in order.
    pub fn sent_to(&self, id: &ConnectionId) -> Vec<&ServerEvent> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::To(target, event) if target == id => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Broadcast events, in order.
    pub fn broadcasts(&self) -> Vec<&ServerEvent> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::Broadcast(event) => Some(event),
                _ => None,
            })
            .collect()
    }
}
