//! Registro explícito de suscriptores a eventos de autenticación

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::models::auth::User;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedUp { email: String },
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

#[derive(Default)]
pub struct AuthEvents {
    next_id: AtomicU64,
    handlers: Mutex<BTreeMap<u64, Handler>>,
}

impl AuthEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.lock().insert(id, Arc::new(handler));
        SubscriptionId(id)
    }

    /// `false` si el id ya no estaba registrado
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().remove(&id.0).is_some()
    }

    /// Notifica en orden de suscripción. Los handlers se copian antes de
    /// invocarlos, así un handler puede desuscribirse sin bloquear.
    pub fn publish(&self, event: &AuthEvent) {
        let handlers: Vec<Handler> = self.lock().values().cloned().collect();
        debug!("📣 Evento de auth {:?} para {} suscriptores", event, handlers.len());
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u64, Handler>> {
        // un handler que paniqueó no invalida el registro
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserId;

    fn user() -> User {
        User {
            id: UserId::Number(7),
            fullname: "Ana".to_string(),
            email: "ana@empresa.com".to_string(),
        }
    }

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let events = AuthEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        events.subscribe(move |e| first.lock().unwrap().push(format!("a:{:?}", e)));
        let second = seen.clone();
        events.subscribe(move |e| second.lock().unwrap().push(format!("b:{:?}", e)));

        events.publish(&AuthEvent::SignedOut);
        assert_eq!(*seen.lock().unwrap(), vec!["a:SignedOut", "b:SignedOut"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let events = AuthEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = events.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        events.publish(&AuthEvent::SignedIn(user()));
        assert!(events.unsubscribe(id));
        assert!(!events.unsubscribe(id));
        events.publish(&AuthEvent::SignedOut);

        assert_eq!(*seen.lock().unwrap(), vec![AuthEvent::SignedIn(user())]);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let events = AuthEvents::new();
        let a = events.subscribe(|_| {});
        let b = events.subscribe(|_| {});
        assert_ne!(a, b);
    }
}
