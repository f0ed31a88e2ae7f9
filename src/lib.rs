pub mod core {
    pub mod config;
    pub mod error;
    pub mod routes;
    pub mod state;
    pub mod tracing_init;
}

pub mod models {
    pub mod report;
    pub mod user;
}

pub mod stores {
    pub mod directory;
}

pub mod api {
    pub mod gateway;
    pub mod panel;
}

pub mod auth {
    pub mod validator;
}

pub mod sync {
    pub mod collect;
    pub mod reconcile;
    pub mod scheduler;
    pub mod secret;
}

pub mod handlers {
    pub mod auth;
    pub mod fallback;
    pub mod health;
}

pub mod utils {
    pub mod time;
}
