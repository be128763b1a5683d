//! Startup redirect
//!
//! Picks the first screen from the authentication state.

use crate::config::RouteSettings;

/// Authentication state at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthSession {
    pub signed_in: bool,
}

/// Signed-in users land on the home tabs, everyone else on the welcome flow
pub fn startup_redirect<'a>(session: &AuthSession, routes: &'a RouteSettings) -> &'a str {
    if session.signed_in {
        &routes.signed_in_home
    } else {
        &routes.welcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_in_goes_home() {
        let routes = RouteSettings::default();
        let target = startup_redirect(&AuthSession { signed_in: true }, &routes);
        assert_eq!(target, "/(root)/(tabs)/home");
    }

    #[test]
    fn test_signed_out_goes_to_welcome() {
        let routes = RouteSettings::default();
        assert_eq!(startup_redirect(&AuthSession::default(), &routes), "/(auth)/welcome");
    }

    #[test]
    fn test_configured_routes() {
        let routes = RouteSettings {
            signed_in_home: "home".into(),
            welcome: "hello".into(),
            ..RouteSettings::default()
        };
        assert_eq!(startup_redirect(&AuthSession { signed_in: true }, &routes), "home");
        assert_eq!(startup_redirect(&AuthSession { signed_in: false }, &routes), "hello");
    }
}
