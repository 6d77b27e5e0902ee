pub mod core {
    pub mod config;
    pub mod error;
    pub mod routes;
    pub mod server;
    pub mod startup;
    pub mod state;
    pub mod tracing_init;
}

pub mod api {
    pub mod image_host;
}

pub mod handlers {
    pub mod auth;
    pub mod fallback;
    pub mod health;
    pub mod metrics;
    pub mod my_hotels;
    pub mod users;
}

pub mod images {
    pub mod data_uri;
    pub mod pipeline;
}

pub mod metrics {
    pub mod collector;
}

pub mod models {
    pub mod account;
    pub mod hotel;
    pub mod user;
}

pub mod security {
    pub mod password;
    pub mod session;
    pub mod token;
}

pub mod services {
    pub mod accounts;
    pub mod hotels;
}

pub mod stores {
    pub mod hotel_store;
    pub mod user_store;
}

pub mod utils {
    pub mod auth;
}

pub mod validation {
    pub mod credentials;
    pub mod hotel_form;
}

pub mod wal {
    pub mod wal;
}

#[cfg(test)]
mod test_support;
