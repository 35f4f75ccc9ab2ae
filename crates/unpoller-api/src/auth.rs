/// The platform type of the UniFi controller.
///
/// Determines URL prefixes and the login path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS device (UDM, UCG, etc.) -- port 443, `/proxy/network/` prefix.
    UnifiOs,
    /// Standalone Network Application (Java) -- port 8443, no prefix.
    ClassicController,
}

impl ControllerPlatform {
    /// The path prefix for API endpoints.
    pub fn api_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    /// The login endpoint path.
    pub fn login_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifi_os_paths_use_proxy_prefix() {
        assert_eq!(ControllerPlatform::UnifiOs.api_prefix(), "/proxy/network");
        assert_eq!(ControllerPlatform::UnifiOs.login_path(), "/api/auth/login");
        assert_eq!(ControllerPlatform::ClassicController.api_prefix(), "");
        assert_eq!(ControllerPlatform::ClassicController.login_path(), "/api/login");
    }
}
