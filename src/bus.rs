//! Shared observable values with one writer and many readers.
//!
//! Readers always see the latest published value; subscriptions replay the
//! current value first and then every later publish.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::config::DashboardConfig;
use crate::types::BasemapId;

struct Shared<T> {
    current: T,
    subscribers: Vec<Sender<T>>,
}

fn lock<T>(shared: &Mutex<Shared<T>>) -> MutexGuard<'_, Shared<T>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Constructor namespace for writer/reader pairs.
pub struct ValueBus;

impl ValueBus {
    /// Create a bus holding `initial`.
    pub fn new<T: Clone>(initial: T) -> (BusWriter<T>, BusReader<T>) {
        let shared = Arc::new(Mutex::new(Shared {
            current: initial,
            subscribers: Vec::new(),
        }));
        (
            BusWriter {
                shared: Arc::clone(&shared),
            },
            BusReader { shared },
        )
    }
}

/// The single writer of a bus. Not `Clone`.
pub struct BusWriter<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T: Clone> BusWriter<T> {
    /// Replace the current value and notify live subscribers.
    pub fn publish(&self, value: T) {
        let mut shared = lock(&self.shared);
        shared.current = value.clone();
        shared
            .subscribers
            .retain(|subscriber| subscriber.send(value.clone()).is_ok());
    }

    /// A reader over the same bus.
    pub fn reader(&self) -> BusReader<T> {
        BusReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Latest published value.
    pub fn current(&self) -> T {
        lock(&self.shared).current.clone()
    }
}

/// Read handle; clone freely.
pub struct BusReader<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for BusReader<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> BusReader<T> {
    /// Latest published value.
    pub fn current(&self) -> T {
        lock(&self.shared).current.clone()
    }

    /// Subscribe to updates, starting with the current value.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        let mut shared = lock(&self.shared);
        tx.send(shared.current.clone()).ok();
        shared.subscribers.push(tx);
        Subscription { rx }
    }
}

/// Ordered stream of values published after (and including) subscription.
pub struct Subscription<T> {
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Next pending value, if any, without blocking.
    pub fn try_next(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain pending values and return the newest.
    pub fn latest(&self) -> Option<T> {
        let mut last = None;
        while let Some(value) = self.try_next() {
            last = Some(value);
        }
        last
    }

    /// Every pending value in publish order.
    pub fn drain(&self) -> Vec<T> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

/// Basemap selection shared between the sidebar and every map view.
pub struct BasemapBus {
    writer: BusWriter<BasemapId>,
}

impl BasemapBus {
    pub fn new(default_basemap: impl Into<BasemapId>) -> Self {
        let (writer, _) = ValueBus::new(default_basemap.into());
        Self { writer }
    }

    /// Bus starting at the configured default basemap.
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.default_basemap.clone())
    }

    /// Publish a new basemap choice.
    pub fn set_basemap(&self, basemap: impl Into<BasemapId>) {
        let basemap = basemap.into();
        info!(basemap = basemap.as_str(), "basemap set");
        self.writer.publish(basemap);
    }

    /// Reader handed to map views.
    pub fn reader(&self) -> BusReader<BasemapId> {
        self.writer.reader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_see_latest_value() {
        let (writer, reader) = ValueBus::new(1);
        let other = reader.clone();
        writer.publish(2);
        assert_eq!(reader.current(), 2);
        assert_eq!(other.current(), 2);
        assert_eq!(writer.current(), 2);
    }

    #[test]
    fn subscriptions_replay_current_then_follow_publishes() {
        let (writer, reader) = ValueBus::new("streets-vector".to_string());
        writer.publish("topo-vector".to_string());
        let sub = reader.subscribe();
        writer.publish("dark-gray-vector".to_string());
        assert_eq!(sub.drain(), vec!["topo-vector", "dark-gray-vector"]);
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let (writer, reader) = ValueBus::new(0u8);
        let kept = reader.subscribe();
        drop(reader.subscribe());
        writer.publish(1);
        assert_eq!(lock(&writer.shared).subscribers.len(), 1);
        assert_eq!(kept.latest(), Some(1));
    }

    #[test]
    fn basemap_bus_starts_at_default() {
        let bus = BasemapBus::new("streets-vector");
        let view = bus.reader();
        let sub = view.subscribe();
        bus.set_basemap("satellite");
        assert_eq!(view.current(), "satellite");
        assert_eq!(sub.drain(), vec!["streets-vector", "satellite"]);
    }

    #[test]
    fn basemap_bus_follows_configured_default() {
        let bus = BasemapBus::from_config(&DashboardConfig::default());
        assert_eq!(bus.reader().current(), "streets-vector");

        let mut config = DashboardConfig::default();
        config.default_basemap = "dark-gray-vector".into();
        assert_eq!(BasemapBus::from_config(&config).reader().current(), "dark-gray-vector");
    }
}
