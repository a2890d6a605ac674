use super::node::NodeId;
use super::{Graph, GraphEvent};
use crate::error::GraphError;

impl Graph {
    /// Whether `producer` may be connected into input `slot` of `consumer`.
    ///
    /// Besides the consumer's own slot rules, the producer must have an output
    /// and the consumer must not already be upstream of the producer.
    pub fn is_connection_available(&self, consumer: NodeId, producer: NodeId, slot: usize) -> bool {
        let (Some(target), Some(source)) = (self.nodes.get(&consumer), self.nodes.get(&producer))
        else {
            return false;
        };
        if !source.metadata().has_output {
            log::debug!("'{}' has no output to connect", source.name);
            return false;
        }
        if !target.accepts(slot, producer) {
            log::debug!(
                "'{}' does not accept '{}' at slot {}",
                target.name,
                source.name,
                slot
            );
            return false;
        }
        if self.is_upstream(consumer, producer) {
            log::debug!(
                "connecting '{}' into '{}' would close a cycle",
                source.name,
                target.name
            );
            return false;
        }
        true
    }

    /// Connects the output of `producer` into input `slot` of `consumer`.
    ///
    /// Returns `false` and changes nothing when the connection is not available.
    /// On success the consumer is marked dirty; nothing is validated.
    pub fn add_connection(&mut self, consumer: NodeId, producer: NodeId, slot: usize) -> bool {
        if !self.is_connection_available(consumer, producer, slot) {
            return false;
        }
        let Some(target) = self.nodes.get_mut(&consumer) else {
            return false;
        };
        target.attach(producer);
        let target_name = target.name.clone();
        if let Some(source) = self.nodes.get_mut(&producer) {
            source.dependents.push(consumer);
        }

        self.context.sink.info(&target_name, "Connected");
        self.events.publish(GraphEvent::Updated(consumer));
        true
    }

    /// Removes the connection in `slot` of `consumer`; later slots shift down.
    /// Returns the producer that was connected there.
    pub fn disconnect(&mut self, consumer: NodeId, slot: usize) -> Result<NodeId, GraphError> {
        let target = self.node_mut(consumer)?;
        let producer = target.detach(slot).ok_or_else(|| GraphError::EmptySlot {
            node: target.name.clone(),
            slot,
        })?;
        if let Some(source) = self.nodes.get_mut(&producer) {
            source.dependents.retain(|d| *d != consumer);
        }

        self.events.publish(GraphEvent::Updated(consumer));
        Ok(producer)
    }

    /// All connections as `(producer, consumer, slot)`, consumers in insertion order.
    pub fn connections(&self) -> Vec<(NodeId, NodeId, usize)> {
        self.nodes()
            .flat_map(|consumer| {
                consumer
                    .incoming
                    .iter()
                    .enumerate()
                    .map(move |(slot, producer)| (*producer, consumer.id, slot))
            })
            .collect()
    }
}
