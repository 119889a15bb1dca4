mod reqwest;

/// Thin JSON transport below the mint client contract.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    pub(crate) client: ::reqwest::Client,
}
