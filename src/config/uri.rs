//! Parsing of sink registration URIs.
//!
//! A registration URI names the sink scheme, the ingestion host and path,
//! and carries the protocol and credentials in its query string:
//!
//! ```text
//! oo://localhost:5080/api/default/app/_json?proto=http&username=u&password=p
//! ```

use url::Url;

use super::{ConfigError, Destination, SinkConfig};

/// Scheme under which the OpenObserve sink is registered.
pub const SINK_SCHEME: &str = "oo";

fn query_value(url: &Url, key: &'static str) -> Result<String, ConfigError> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingParameter(key))
}

fn authority(url: &Url) -> Result<String, ConfigError> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(ConfigError::MissingHost)?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

pub(super) fn parse(uri: &str) -> Result<SinkConfig, ConfigError> {
    let url = Url::parse(uri).map_err(|err| ConfigError::InvalidUri(err.to_string()))?;
    if url.scheme() != SINK_SCHEME {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_owned()));
    }
    let authority = authority(&url)?;

    let proto = query_value(&url, "proto")?;
    if proto != "http" && proto != "https" {
        return Err(ConfigError::InvalidProto(proto));
    }
    let username = query_value(&url, "username")?;
    let password = query_value(&url, "password")?;

    let target = format!("{proto}://{authority}{}", url.path());
    Ok(SinkConfig {
        destination: Destination::new(target, username, password),
        connect_timeout: None,
        timeout: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn assembles_destination_from_uri() {
        let config = SinkConfig::from_uri(
            "oo://localhost:5080/api/default/quickstart1/_json?proto=http&username=root@example.com&password=Complexpass%23123",
        )
        .expect("valid uri");
        let dest = &config.destination;
        assert_eq!(dest.url(), "http://localhost:5080/api/default/quickstart1/_json");
        assert_eq!(dest.username(), "root@example.com");
        assert_eq!(dest.password(), "Complexpass#123");
    }

    #[rstest]
    fn keeps_host_without_port_and_empty_path() {
        let config = SinkConfig::from_uri("oo://logs.example.com?proto=https&username=u&password=p")
            .expect("valid uri");
        assert_eq!(config.destination.url(), "https://logs.example.com");
    }

    #[rstest]
    #[case("oo://h/p?proto=http&username=u", ConfigError::MissingParameter("password"))]
    #[case("oo://h/p?proto=http&password=p", ConfigError::MissingParameter("username"))]
    #[case("oo://h/p?username=u&password=p", ConfigError::MissingParameter("proto"))]
    #[case("oo://h/p?proto=http&username=u&password=", ConfigError::MissingParameter("password"))]
    #[case("oo://h/p?proto=gopher&username=u&password=p", ConfigError::InvalidProto("gopher".into()))]
    #[case("http://h/p?proto=http&username=u&password=p", ConfigError::UnsupportedScheme("http".into()))]
    #[case("oo:/p?proto=http&username=u&password=p", ConfigError::MissingHost)]
    fn rejects_incomplete_uris(#[case] uri: &str, #[case] expected: ConfigError) {
        assert_eq!(SinkConfig::from_uri(uri).expect_err("must fail"), expected);
    }

    #[rstest]
    fn rejects_unparseable_uri() {
        let err = SinkConfig::from_uri("not a uri").expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidUri(_)));
    }
}
