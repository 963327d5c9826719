//! Types related to [`LoaderConfig`].

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
/// Configure how a [`ParamLoader`] stores and propagates its outcomes.
///
/// It can be embedded in your application configuration:
///
/// ```rust
/// use param_loader::config::LoaderConfig;
///
/// let config: LoaderConfig = serde_json::from_str(r#"{ "used_name": "user" }"#).unwrap();
/// assert_eq!(config.used_name.as_deref(), Some("user"));
/// assert!(!config.raise_on_error);
/// ```
///
/// [`ParamLoader`]: crate::ParamLoader
pub struct LoaderConfig {
    #[serde(default)]
    /// The key used to store the outcome in the request context.
    ///
    /// If `None`, the name of the route parameter is used.
    pub used_name: Option<String>,
    #[serde(default)]
    /// If `true`, failures are propagated to the pipeline and nothing is written
    /// into the request context.
    /// If `false`, failures are recorded into the request context and the pipeline
    /// carries on.
    ///
    /// Defaults to `false`.
    pub raise_on_error: bool,
}

impl LoaderConfig {
    /// The default configuration: outcomes are stored under the route parameter name,
    /// failures are recorded into the request context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome under `name` rather than under the route parameter name.
    pub fn used_name(mut self, name: impl Into<String>) -> Self {
        self.used_name = Some(name.into());
        self
    }

    /// Choose whether failures should be propagated to the pipeline.
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }
}
