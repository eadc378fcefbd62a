use serde::{Deserialize, Serialize};

use crate::core::tenant::Branding;

/// Where the winning theme came from. Useful in logs when a tenant reports
/// unexpected branding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeSource {
    TenantBranding,
    IssuerConfig,
    DefaultTenant,
    BuiltIn,
}

/// The theme handed to server-rendered pages after the priority chain runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTheme {
    pub name: String,
    pub logo_light: Option<String>,
    pub logo_dark: Option<String>,
    pub favicon: Option<String>,
    pub custom_css: Option<String>,
    pub source: ThemeSource,
}

/// Built-in fallback when no tenant, issuer config, or default tenant
/// provides a theme.
pub const BUILTIN_THEME: &str = "default";

impl ResolvedTheme {
    pub fn builtin() -> Self {
        Self {
            name: BUILTIN_THEME.to_string(),
            logo_light: None,
            logo_dark: None,
            favicon: None,
            custom_css: None,
            source: ThemeSource::BuiltIn,
        }
    }

    /// Lift a tenant's branding into a resolved theme, if it names one.
    pub fn from_branding(branding: &Branding, source: ThemeSource) -> Option<Self> {
        branding.theme.as_ref().map(|name| Self {
            name: name.clone(),
            logo_light: branding.logo_light.clone(),
            logo_dark: branding.logo_dark.clone(),
            favicon: branding.favicon.clone(),
            custom_css: branding.custom_css.clone(),
            source,
        })
    }

    /// Issuer-level configured theme (no logos attached at this level).
    pub fn from_issuer_config(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logo_light: None,
            logo_dark: None,
            favicon: None,
            custom_css: None,
            source: ThemeSource::IssuerConfig,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branding_without_theme_yields_nothing() {
        let branding = Branding {
            logo_light: Some("light.svg".to_string()),
            ..Default::default()
        };
        assert!(ResolvedTheme::from_branding(&branding, ThemeSource::TenantBranding).is_none());
    }

    #[test]
    fn test_branding_carries_assets() {
        let branding = Branding {
            theme: Some("midnight".to_string()),
            logo_dark: Some("dark.svg".to_string()),
            ..Default::default()
        };
        let theme =
            ResolvedTheme::from_branding(&branding, ThemeSource::TenantBranding).unwrap();
        assert_eq!(theme.name, "midnight");
        assert_eq!(theme.logo_dark.as_deref(), Some("dark.svg"));
        assert_eq!(theme.source, ThemeSource::TenantBranding);
    }
}
