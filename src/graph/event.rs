use super::node::NodeId;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Structural and selection changes of a graph, delivered to subscribers in
/// the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    Created(NodeId),
    /// The node is gone by the time this is received; its name is kept for display.
    Deleted { id: NodeId, name: String },
    Updated(NodeId),
    Selected(NodeId),
    Deselected(NodeId),
}

impl GraphEvent {
    pub fn node(&self) -> NodeId {
        match self {
            GraphEvent::Created(id)
            | GraphEvent::Updated(id)
            | GraphEvent::Selected(id)
            | GraphEvent::Deselected(id) => *id,
            GraphEvent::Deleted { id, .. } => *id,
        }
    }
}

/// Fans graph events out to any number of channel subscribers.
#[derive(Debug, Default)]
pub(super) struct EventBus {
    subscribers: Vec<Sender<GraphEvent>>,
}

impl EventBus {
    pub(super) fn subscribe(&mut self) -> Receiver<GraphEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Sends `event` to every live subscriber and forgets the ones that hung up.
    pub(super) fn publish(&mut self, event: GraphEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub(super) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
