use std::env;

#[derive(Clone, Debug)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub frontend_url: String,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            callback_url: env::var("GOOGLE_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api/auth/callback".to_string()),
            auth_url: env::var("GOOGLE_AUTH_URL")
                .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string()),
            token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string()),
            userinfo_url: env::var("GOOGLE_USERINFO_URL").unwrap_or_else(|_| {
                "https://openidconnect.googleapis.com/v1/userinfo".to_string()
            }),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    /// The Google consent-screen URL the login endpoint redirects to.
    pub fn authorize_redirect_url(&self) -> String {
        let query = serde_urlencoded::to_string([
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
            ("response_type", "code"),
            ("scope", "openid profile email"),
        ])
        .unwrap_or_default();

        format!("{}?{}", self.auth_url, query)
    }
}
