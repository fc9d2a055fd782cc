/// Where a request ends up once the session has been looked at.
#[derive(Debug, PartialEq, Eq)]
pub enum Gate {
    Pass,
    ToLogin,
    ToDashboard,
}

pub const LOGIN: &str = "/login";
pub const DASHBOARD: &str = "/dashboard";

const AUTH_PAGES: &[&str] = &["/login", "/signup"];
const PROBES: &[&str] = &["/healthz", "/livez"];

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.iter().any(|p| under(path, p))
}

fn is_public(path: &str) -> bool {
    is_auth_page(path) || PROBES.iter().any(|p| under(path, p))
}

pub fn gate(path: &str, authenticated: bool) -> Gate {
    match (authenticated, is_auth_page(path), is_public(path)) {
        (true, true, _) => Gate::ToDashboard,
        (false, _, false) => Gate::ToLogin,
        _ => Gate::Pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_requests_to_protected_pages_go_to_login() {
        for path in [
            "/",
            "/dashboard",
            "/profile",
            "/network",
            "/jobs",
            "/recruiters",
            "/posts/1/like",
            "/loginx",
        ] {
            assert_eq!(gate(path, false), Gate::ToLogin, "{}", path);
        }
    }

    #[test]
    fn test_signed_in_users_skip_auth_pages() {
        assert_eq!(gate("/login", true), Gate::ToDashboard);
        assert_eq!(gate("/signup", true), Gate::ToDashboard);
        assert_eq!(gate("/signup/", true), Gate::ToDashboard);
    }

    #[test]
    fn test_public_paths_pass_anonymously() {
        for path in ["/login", "/signup", "/healthz", "/livez"] {
            assert_eq!(gate(path, false), Gate::Pass, "{}", path);
        }
    }

    #[test]
    fn test_signed_in_users_reach_everything_else() {
        for path in ["/dashboard", "/jobs", "/healthz", "/profile"] {
            assert_eq!(gate(path, true), Gate::Pass, "{}", path);
        }
    }
}
