//! Inbound event channel definitions.
//!
//! The adapter and processing pipeline of a channel are capabilities rather
//! than opaque slots: an adapter hands out a lazy sequence of raw events, a
//! pipeline turns each raw event into zero or more payloads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A raw event as received by a channel adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub headers: HashMap<String, String>,
    pub body: serde_json::Value,
}

/// Result of running an inbound event through a processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub event_key: String,
    pub data: serde_json::Value,
}

pub trait InboundEventChannelAdapter: Send + Sync {
    fn inbound_events(&self) -> Box<dyn Iterator<Item = InboundEvent> + Send + '_>;
}

pub trait InboundEventProcessingPipeline: Send + Sync {
    fn process(&self, event: InboundEvent) -> Vec<EventPayload>;
}

#[derive(Default)]
pub struct InboundChannelModel {
    pub key: String,
    pub category: Option<String>,
    pub name: Option<String>,
    pub channel_type: Option<String>,
    pub adapter: Option<Box<dyn InboundEventChannelAdapter>>,
    pub pipeline: Option<Box<dyn InboundEventProcessingPipeline>>,
}

impl fmt::Debug for InboundChannelModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundChannelModel")
            .field("key", &self.key)
            .field("category", &self.category)
            .field("name", &self.name)
            .field("channel_type", &self.channel_type)
            .field("adapter", &self.adapter.is_some())
            .field("pipeline", &self.pipeline.is_some())
            .finish()
    }
}

impl InboundChannelModel {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_adapter(mut self, adapter: impl InboundEventChannelAdapter + 'static) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }

    pub fn with_pipeline(mut self, pipeline: impl InboundEventProcessingPipeline + 'static) -> Self {
        self.pipeline = Some(Box::new(pipeline));
        self
    }

    /// Lazily pulls events from the adapter through the pipeline. A channel
    /// without an adapter yields nothing; one without a pipeline forwards the
    /// event body keyed by the channel key.
    pub fn drain(&self) -> impl Iterator<Item = EventPayload> + '_ {
        let events: Box<dyn Iterator<Item = InboundEvent> + Send + '_> = match &self.adapter {
            Some(adapter) => adapter.inbound_events(),
            None => Box::new(std::iter::empty()),
        };

        events.flat_map(move |event| match &self.pipeline {
            Some(pipeline) => pipeline.process(event),
            None => vec![EventPayload {
                event_key: self.key.clone(),
                data: event.body,
            }],
        })
    }
}
