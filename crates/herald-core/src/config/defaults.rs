//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Herald".to_string()
}

pub fn default_data_dir() -> String {
    "~/.herald".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_bridge_url() -> String {
    "http://127.0.0.1:8085".to_string()
}

pub fn default_chat_suffix() -> String {
    "@c.us".to_string()
}

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_status_poll() -> u64 {
    5
}

pub fn default_min_delay() -> u64 {
    5
}

pub fn default_max_delay() -> u64 {
    12
}

pub fn default_poll_interval_ms() -> u64 {
    200
}

pub fn default_send_timeout() -> u64 {
    60
}

pub fn default_fallback_name() -> String {
    "Sir/Madam".to_string()
}

pub fn default_contacts_path() -> String {
    "contacts.json".to_string()
}

pub fn default_templates_path() -> String {
    "templates.json".to_string()
}

pub fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_api_port() -> u16 {
    3000
}

pub fn default_static_dir() -> String {
    "public".to_string()
}
