//! API configuration assembled from the shared application config

use std::time::Duration;

use otp_core::{ChannelKind, OtpResult, StaticTemplates, VerificationConfig};
use otp_shared::AppConfig;

/// Name under which a configured default template is registered
pub const DEFAULT_TEMPLATE_NAME: &str = "default";

/// Runtime configuration of the HTTP host
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub app: AppConfig,
    pub verification: VerificationConfig,
    /// How long a closed session stays queryable before it is pruned
    pub session_retention: Duration,
}

impl ApiConfig {
    /// Load configuration from the environment
    pub fn from_env() -> OtpResult<Self> {
        Self::from_app_config(AppConfig::from_env())
    }

    pub fn from_app_config(app: AppConfig) -> OtpResult<Self> {
        let verification = VerificationConfig::from(&app.otp);
        verification.validate()?;

        let session_retention = Duration::from_secs(verification.user_timeout_secs * 2);
        Ok(Self {
            app,
            verification,
            session_retention,
        })
    }

    /// Templates available to sessions created through the API
    ///
    /// A configured default template is registered for both channel kinds
    /// under [`DEFAULT_TEMPLATE_NAME`].
    pub fn templates(&self) -> StaticTemplates {
        let mut templates = StaticTemplates::new();
        if let Some(template) = &self.app.otp.default_template {
            for kind in [ChannelKind::Sms, ChannelKind::Email] {
                templates.insert(DEFAULT_TEMPLATE_NAME, kind, template);
            }
        }
        templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otp_core::MessageTemplates;

    #[test]
    fn test_defaults_pass_validation() {
        let config = ApiConfig::from_app_config(AppConfig::development()).unwrap();
        assert_eq!(config.verification.user_timeout_secs, 180);
        assert_eq!(config.session_retention, Duration::from_secs(360));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut app = AppConfig::development();
        app.otp.user_timeout_secs = 0;

        let error = ApiConfig::from_app_config(app).unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_default_template_registered_for_both_kinds() {
        let mut app = AppConfig::development();
        app.otp.default_template = Some("Code: <OTP>".to_string());
        let templates = ApiConfig::from_app_config(app).unwrap().templates();

        assert_eq!(
            templates.find(DEFAULT_TEMPLATE_NAME, ChannelKind::Sms),
            Some("Code: <OTP>".to_string())
        );
        assert!(templates.find(DEFAULT_TEMPLATE_NAME, ChannelKind::Email).is_some());
    }
}
