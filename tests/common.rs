use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use httptest::{matchers::request, responders::json_encoded, Expectation, Server};
use hyphen_toggle::{
    models::{ToggleContext, ToggleOptions},
    Toggle, ERROR_EVENT,
};
use serde_json::json;

pub const PUBLIC_KEY: &str = "public_dGVzdC1vcmc6c2VjcmV0";
pub const EVALUATE_PATH: &str = "/toggle/evaluate";

pub fn expect_evaluation(server: &Server) {
    server.expect(
        Expectation::matching(request::method_path("POST", EVALUATE_PATH))
            .times(..)
            .respond_with(json_encoded(json!({
                "toggles": {
                    "new-checkout": {
                        "key": "new-checkout",
                        "value": true,
                        "type": "boolean",
                        "reason": "rule matched"
                    },
                    "banner-text": {
                        "key": "banner-text",
                        "value": "Welcome back",
                        "type": "string"
                    },
                    "max-items": {
                        "key": "max-items",
                        "value": 42,
                        "type": "number"
                    },
                    "theme": {
                        "key": "theme",
                        "value": { "color": "blue", "dark": true },
                        "type": "object"
                    }
                }
            }))),
    );
}

pub fn create_toggle(horizon_urls: Vec<String>) -> Toggle {
    Toggle::new(ToggleOptions {
        public_api_key: Some(PUBLIC_KEY.to_string()),
        application_id: Some("web".to_string()),
        environment: Some("production".to_string()),
        horizon_urls: Some(horizon_urls),
        default_context: Some(ToggleContext::new("user-123".to_string())),
        ..Default::default()
    })
}

pub fn server_url(server: &Server) -> String {
    format!("http://{}", server.addr())
}

/// Counts the error events emitted by `toggle`.
pub fn count_errors(toggle: &Toggle) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    toggle.on(ERROR_EVENT, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    count
}
