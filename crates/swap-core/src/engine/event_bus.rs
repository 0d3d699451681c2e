//! Broadcast bus for swap progress events.

use swap_types::SwapEvent;
use tokio::sync::broadcast;

/// Clonable handle for broadcasting [`SwapEvent`]s to any number of
/// subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<SwapEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event. Fails only when no subscriber exists, which
	/// callers are free to ignore.
	pub fn publish(
		&self,
		event: SwapEvent,
	) -> Result<(), broadcast::error::SendError<SwapEvent>> {
		self.sender.send(event).map(|_| ())
	}

	/// Registers a new subscriber receiving all events published from
	/// this point on.
	pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
		self.sender.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::U256;

	#[tokio::test]
	async fn test_delivers_events_to_subscribers() {
		let bus = EventBus::new(16);
		let mut events = bus.subscribe();

		bus.publish(SwapEvent::InsufficientBalance {
			available: U256::ZERO,
			requested: U256::from(10u64),
		})
		.ok();

		let event = events.recv().await.unwrap();
		assert!(matches!(event, SwapEvent::InsufficientBalance { .. }));
	}

	#[test]
	fn test_publishing_without_subscribers_is_harmless() {
		let bus = EventBus::new(16);
		let result = bus.publish(SwapEvent::InsufficientBalance {
			available: U256::ZERO,
			requested: U256::ZERO,
		});
		assert!(result.is_err());
	}
}
