pub mod config;
pub mod error;
pub mod router;
pub mod state;

pub mod crypto {
    pub mod aes;
    pub mod cipher;
    pub mod csrf;
}

pub mod models {
    pub mod attendance;
    pub mod content;
    pub mod credentials;
    pub mod incident;
    pub mod outcome;
    pub mod report;
    pub mod session;
}

pub mod validation {
    pub mod auth;
    pub mod dates;
    pub mod diary;
}

pub mod sge {
    pub mod client;
    pub mod endpoints;
    pub mod session_pool;
    pub mod transport;
}

pub mod parsers {
    pub mod attendance_table;
    pub mod content_table;
    pub mod html;
    pub mod incidents;
    pub mod json;
    pub mod sanitize;
    pub mod select;
}

pub mod services {
    pub mod attendance;
    pub mod content;
    pub mod incidents;
    pub mod reports;
}

pub mod handlers {
    pub mod attendance;
    pub mod auth;
    pub mod content;
    pub mod incidents;
    pub mod reports;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod csrf;
    pub mod rate_limit;
}
