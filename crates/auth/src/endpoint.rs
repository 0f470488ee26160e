use url::Url;

/// Joins `relative` onto `issuer` the way a realm's well-known endpoints
/// are published (`<issuer>/protocol/openid-connect/...`), regardless of
/// whether the configured issuer URL carries a trailing slash — `Url::join`
/// would otherwise drop the realm path segment when it doesn't.
pub(crate) fn realm_relative(issuer: &Url, relative: &str) -> Url {
    let mut base = issuer.clone();

    if !base.path().ends_with('/') {
        let mut path = base.path().to_string();
        path.push('/');
        base.set_path(&path);
    }

    base.join(relative).unwrap_or_else(|_| base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_realm_path_segment() {
        let issuer = Url::parse("https://kc.example/realms/myrealm").unwrap();
        let joined = realm_relative(&issuer, "protocol/openid-connect/certs");
        assert_eq!(joined.as_str(), "https://kc.example/realms/myrealm/protocol/openid-connect/certs");
    }

    #[test]
    fn tolerates_an_existing_trailing_slash() {
        let issuer = Url::parse("https://kc.example/realms/myrealm/").unwrap();
        let joined = realm_relative(&issuer, "protocol/openid-connect/token");
        assert_eq!(joined.as_str(), "https://kc.example/realms/myrealm/protocol/openid-connect/token");
    }
}
