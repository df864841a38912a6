use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;

use crate::{LinkConfig, SocketLink};

/// One [`SocketLink`] per TCP port, spawned on first request.
///
/// The registry is an ordinary value: whoever owns the device factory
/// creates one and shares it. Links are never removed, so a port stays
/// bound for as long as the registry lives.
pub struct LinkRegistry {
    config: LinkConfig,
    links: Mutex<HashMap<u16, Arc<SocketLink>>>,
}

impl LinkRegistry {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            links: Mutex::new(HashMap::new()),
        }
    }

    /// The link serving `port`, spawning it if this is the first request.
    pub fn link(&self, port: u16) -> Arc<SocketLink> {
        let mut links = self.links.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(links.entry(port).or_insert_with(|| {
            debug!("UART link registry: spawning link for port {port}");
            Arc::new(SocketLink::spawn(port, &self.config))
        }))
    }

    /// The link serving `port`, if one was spawned.
    pub fn get(&self, port: u16) -> Option<Arc<SocketLink>> {
        self.links
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&port)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
