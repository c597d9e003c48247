use tokio::sync::mpsc;
use tracing::debug;

/// Screens the HTTP layer can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
}

/// Receives route replacements out-of-band from the request that caused them.
pub trait Navigator: Send + Sync {
    fn replace(&self, route: Route);
}

/// Forwards routes over a channel for the front end to act on.
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn replace(&self, route: Route) {
        if self.tx.send(route).is_err() {
            debug!(?route, "Navigation receiver dropped");
        }
    }
}

/// Ignores navigation, for headless callers.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn replace(&self, _route: Route) {}
}
