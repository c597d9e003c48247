#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use journ_core::api::{Gateway, GatewayOptions, JournalApi, Navigator, Route, UnauthorizedPolicy};
use journ_core::auth::{MemoryStorage, Session, SessionStore};
use serde_json::json;

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });
    format!("http://{}/", addr)
}

/// Records every route it is asked to show
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub fn count(&self, route: Route) -> usize {
        self.routes().iter().filter(|r| **r == route).count()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct Harness {
    pub store: SessionStore,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub gateway: Gateway,
    pub api: JournalApi,
}

pub async fn harness(base_url: &str, policy: UnauthorizedPolicy) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.restore().await;

    let navigator = Arc::new(RecordingNavigator::default());
    let options = GatewayOptions {
        unauthorized_policy: policy,
        initial_backoff: Duration::from_millis(10),
        ..GatewayOptions::new(base_url)
    };
    let gateway = Gateway::new(store.clone(), navigator.clone(), options).unwrap();
    let api = JournalApi::new(gateway.clone());

    Harness {
        store,
        storage,
        navigator,
        gateway,
        api,
    }
}

pub fn session(token: &str) -> Session {
    Session::new(json!({
        "message": "Successful Login",
        "access_token": token,
        "refresh_token": format!("{}-refresh", token),
        "user_id": 1,
        "user_email": "user@example.com"
    }))
}
