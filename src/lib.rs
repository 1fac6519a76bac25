pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
pub mod templates;

pub mod crypto {
    pub mod csrf;
}

pub mod models {
    pub mod session;
    pub mod snippet;
    pub mod user;
}

pub mod repositories {
    pub mod snippet;
    pub mod user;
}

pub mod services {
    pub mod auth;
}

pub mod session;

pub mod handlers {
    pub mod assets;
    pub mod snippets;
    pub mod system;
    pub mod users;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod csrf;
    pub mod headers;
    pub mod recover;
    pub mod session;
}

pub mod validation {
    pub mod auth;
    pub mod snippet;
    pub mod validator;
}
