use serde::{de::DeserializeOwned, Serialize};
use tracing::{event, Level};

use crate::{
    endpoints::default_horizon_url,
    error::{Result, ToggleError},
    events::{EventEmitter, ERROR_EVENT},
    http::{HorizonHttpClient, RequestOptions},
    key::{decode_organization_id, validate_public_key},
    models::{
        EvaluationRequest, EvaluationResponse, GetOptions, ToggleContext, ToggleOptions,
    },
    targeting::{context_target_key, generate_target_key, resolve_target_key},
};

pub const DEFAULT_ENVIRONMENT: &str = "development";
const EVALUATE_PATH: &str = "/toggle/evaluate";

/// Hyphen Toggle client that evaluates toggles remotely against a set of
/// horizon URLs, trying them in order.
///
/// Evaluation never fails: on any error an [`ERROR_EVENT`] is emitted and
/// the caller's default value is returned.
pub struct Toggle {
    public_api_key: Option<String>,
    organization_id: Option<String>,
    horizon_urls: Vec<String>,
    default_context: ToggleContext,
    application_id: Option<String>,
    environment: String,
    default_target_key: String,
    http_client: HorizonHttpClient,
    events: EventEmitter<ToggleError>,
}

impl Toggle {
    pub fn new(options: ToggleOptions) -> Self {
        let public_api_key = options.public_api_key.filter(|key| !key.is_empty());
        let organization_id = decode_organization_id(public_api_key.as_deref());

        let horizon_urls = match (options.horizon_urls, &public_api_key) {
            (Some(urls), _) => urls,
            (None, Some(key)) => vec![default_horizon_url(Some(key))],
            (None, None) => vec![],
        };

        let environment = options
            .environment
            .filter(|env| !env.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let application_id = options.application_id;

        let default_target_key = match options.default_target_key {
            Some(key) => key,
            None => options
                .default_context
                .as_ref()
                .and_then(context_target_key)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    generate_target_key(application_id.as_deref().unwrap_or_default(), &environment)
                }),
        };

        Self {
            public_api_key,
            organization_id,
            horizon_urls,
            default_context: options.default_context.unwrap_or_default(),
            application_id,
            environment,
            default_target_key,
            http_client: HorizonHttpClient::new(),
            events: EventEmitter::new(),
        }
    }

    pub fn public_api_key(&self) -> Option<&str> {
        self.public_api_key.as_deref()
    }

    /// Replaces the public API key. Keys must start with `public_`.
    ///
    /// Setting a key re-derives the organization id. Clearing it keeps the
    /// previously derived organization id.
    pub fn set_public_api_key(&mut self, key: Option<String>) -> Result<()> {
        if let Some(key) = &key {
            validate_public_key(key)?;
            self.organization_id = decode_organization_id(Some(key));
        }
        self.public_api_key = key;
        Ok(())
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn set_organization_id(&mut self, organization_id: Option<String>) {
        self.organization_id = organization_id;
    }

    pub fn horizon_urls(&self) -> &[String] {
        &self.horizon_urls
    }

    /// Replaces the horizon URLs. An empty list disables all requests.
    pub fn set_horizon_urls(&mut self, urls: Vec<String>) {
        self.horizon_urls = urls;
    }

    pub fn default_context(&self) -> &ToggleContext {
        &self.default_context
    }

    pub fn set_default_context(&mut self, context: ToggleContext) {
        self.default_context = context;
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    pub fn set_application_id(&mut self, application_id: Option<String>) {
        self.application_id = application_id;
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Sets the environment; an empty name resets it to [`DEFAULT_ENVIRONMENT`].
    pub fn set_environment(&mut self, environment: String) {
        self.environment = if environment.is_empty() {
            DEFAULT_ENVIRONMENT.to_string()
        } else {
            environment
        };
    }

    pub fn default_target_key(&self) -> &str {
        &self.default_target_key
    }

    pub fn set_default_target_key(&mut self, key: String) {
        self.default_target_key = key;
    }

    /// Subscribes to a named event. Evaluation failures are emitted as
    /// [`ERROR_EVENT`].
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&ToggleError) + Send + Sync + 'static,
    {
        self.events.on(event, handler);
    }

    /// Sends a request to the configured horizon URLs, authenticated with the
    /// public API key, and returns the first successful JSON response.
    pub async fn fetch<T, P>(
        &self,
        path: &str,
        payload: Option<&P>,
        options: RequestOptions,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.http_client
            .send(
                &self.horizon_urls,
                self.public_api_key.as_deref(),
                path,
                payload,
                options,
            )
            .await
    }

    /// Evaluates a toggle, returning `default_value` if anything goes wrong.
    pub async fn get<T: DeserializeOwned>(
        &self,
        toggle_key: &str,
        default_value: T,
        options: GetOptions,
    ) -> T {
        match self.evaluate(toggle_key, options).await {
            Ok(value) => value,
            Err(err) => {
                event!(
                    Level::ERROR,
                    "Failed to evaluate toggle {}: {}",
                    toggle_key,
                    err
                );
                self.events.emit(ERROR_EVENT, &err);
                default_value
            }
        }
    }

    pub async fn get_boolean(
        &self,
        toggle_key: &str,
        default_value: bool,
        options: GetOptions,
    ) -> bool {
        self.get(toggle_key, default_value, options).await
    }

    pub async fn get_string(
        &self,
        toggle_key: &str,
        default_value: String,
        options: GetOptions,
    ) -> String {
        self.get(toggle_key, default_value, options).await
    }

    pub async fn get_number(
        &self,
        toggle_key: &str,
        default_value: f64,
        options: GetOptions,
    ) -> f64 {
        self.get(toggle_key, default_value, options).await
    }

    pub async fn get_object<T: DeserializeOwned>(
        &self,
        toggle_key: &str,
        default_value: T,
        options: GetOptions,
    ) -> T {
        self.get(toggle_key, default_value, options).await
    }
}

// Private methods
impl Toggle {
    async fn evaluate<T: DeserializeOwned>(
        &self,
        toggle_key: &str,
        options: GetOptions,
    ) -> Result<T> {
        let request = self.build_request(options.context.as_ref());

        if self.public_api_key.is_none() {
            return Err(ToggleError::MissingCredential);
        }
        if request.application.is_empty() {
            return Err(ToggleError::MissingApplication);
        }

        let mut response: EvaluationResponse = self
            .fetch(EVALUATE_PATH, Some(&request), RequestOptions::default())
            .await?;

        let evaluation = response
            .toggles
            .remove(toggle_key)
            .ok_or_else(|| ToggleError::ToggleNotFound(toggle_key.to_string()))?;
        event!(
            Level::DEBUG,
            "Toggle {} evaluated to {} ({:?})",
            toggle_key,
            evaluation.value,
            evaluation.kind
        );

        serde_json::from_value(evaluation.value).map_err(|source| ToggleError::InvalidValue {
            key: toggle_key.to_string(),
            source,
        })
    }

    /// A per-call context replaces the default context as a whole.
    fn build_request(&self, context: Option<&ToggleContext>) -> EvaluationRequest {
        let context = context.unwrap_or(&self.default_context);
        EvaluationRequest {
            application: self.application_id.clone().unwrap_or_default(),
            environment: self.environment.clone(),
            targeting_key: resolve_target_key(context, &self.default_target_key),
            ip_address: context.ip_address.clone(),
            user: context.user.clone(),
            custom_attributes: context.custom_attributes.clone(),
        }
    }
}
